//! Match Event Ledger: goals/assists/cards per match, mirrored into per-tournament
//! player statistics.
//!
//! The event write and the statistic write are two steps. When the second one fails the
//! first is compensated (event deleted again, or re-inserted on removal) and the original
//! error is returned. If compensation fails too, `recompute_player_statistics` rebuilds
//! the counters from the event log.

use crate::logic::fetch;
use crate::models::{
    EventId, EventType, GameMatch, MatchEvent, MatchId, PlayerId, PlayerStatistic, TeamId,
    TournamentError, TournamentId,
};
use crate::store::EntityStore;
use chrono::Utc;
use serde::Deserialize;
use std::cmp::Reverse;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
pub struct NewEvent {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub event_type: EventType,
    #[serde(default)]
    pub minute: Option<u32>,
}

fn find_statistic<S: EntityStore>(
    store: &S,
    tournament_id: TournamentId,
    player_id: PlayerId,
    team_id: TeamId,
) -> Result<Option<PlayerStatistic>, TournamentError> {
    Ok(store
        .query(|s: &PlayerStatistic| {
            s.tournament_id == tournament_id && s.player_id == player_id && s.team_id == team_id
        })?
        .into_iter()
        .next())
}

fn apply_to_statistics<S: EntityStore>(store: &S, event: &MatchEvent) -> Result<(), TournamentError> {
    match find_statistic(store, event.tournament_id, event.player_id, event.team_id)? {
        Some(mut stat) => {
            stat.apply_event(event.event_type);
            store.update(&stat)?;
        }
        None => {
            let mut stat = PlayerStatistic::new(event.tournament_id, event.player_id, event.team_id);
            stat.apply_event(event.event_type);
            store.insert(&stat)?;
        }
    }
    Ok(())
}

fn revert_from_statistics<S: EntityStore>(store: &S, event: &MatchEvent) -> Result<(), TournamentError> {
    match find_statistic(store, event.tournament_id, event.player_id, event.team_id)? {
        Some(mut stat) => {
            stat.revert_event(event.event_type);
            store.update(&stat)?;
        }
        None => log::debug!("No statistics to revert for event {}", event.id),
    }
    Ok(())
}

/// Record an event and bump the player's statistics.
pub fn add_event<S: EntityStore>(store: &S, new: NewEvent) -> Result<MatchEvent, TournamentError> {
    let game: GameMatch = fetch(store, new.match_id, "Match")?;
    if !game.involves(new.team_id) {
        return Err(TournamentError::PreconditionFailed(format!(
            "team {} does not play in match {}",
            new.team_id, new.match_id
        )));
    }

    let event = MatchEvent {
        id: Uuid::new_v4(),
        tournament_id: game.tournament_id,
        match_id: game.id,
        player_id: new.player_id,
        team_id: new.team_id,
        event_type: new.event_type,
        minute: new.minute,
        created_at: Utc::now(),
    };
    store.insert(&event)?;

    if let Err(e) = apply_to_statistics(store, &event) {
        log::warn!("Statistics update for event {} failed, withdrawing event: {}", event.id, e);
        if let Err(undo) = store.delete_where(|m: &MatchEvent| m.id == event.id) {
            log::error!(
                "Event {} kept without statistics ({}); recompute statistics for {}",
                event.id,
                undo,
                event.tournament_id
            );
        }
        return Err(e);
    }
    log::debug!("{:?} for player {} in match {}", event.event_type, event.player_id, event.match_id);
    Ok(event)
}

/// Remove an event and undo its statistics delta.
pub fn remove_event<S: EntityStore>(store: &S, event_id: EventId) -> Result<MatchEvent, TournamentError> {
    let event: MatchEvent = fetch(store, event_id, "Event")?;
    store.delete_where(|m: &MatchEvent| m.id == event_id)?;

    if let Err(e) = revert_from_statistics(store, &event) {
        log::warn!("Statistics revert for event {} failed, restoring event: {}", event.id, e);
        if let Err(undo) = store.insert(&event) {
            log::error!(
                "Event {} removed without statistics revert ({}); recompute statistics for {}",
                event.id,
                undo,
                event.tournament_id
            );
        }
        return Err(e);
    }
    Ok(event)
}

/// Rebuild goal/assist/card counters of a tournament from its event log.
///
/// Suspension state of existing rows is kept (served matches are not in the log), and
/// yellows already wiped by a served suspension are not counted again. New rows get the
/// suspension their cards imply. Returns the number of rows written.
pub fn recompute_player_statistics<S: EntityStore>(
    store: &S,
    tournament_id: TournamentId,
) -> Result<usize, TournamentError> {
    let events = store.query(|e: &MatchEvent| e.tournament_id == tournament_id)?;
    let existing = store.query(|s: &PlayerStatistic| s.tournament_id == tournament_id)?;

    // (player, team) in first-seen order: existing rows, then events.
    let mut keys: Vec<(PlayerId, TeamId)> = existing.iter().map(|s| (s.player_id, s.team_id)).collect();
    for e in &events {
        if !keys.contains(&(e.player_id, e.team_id)) {
            keys.push((e.player_id, e.team_id));
        }
    }

    let mut written = 0;
    for (player_id, team_id) in keys {
        let mut derived = PlayerStatistic::new(tournament_id, player_id, team_id);
        for e in events.iter().filter(|e| e.player_id == player_id && e.team_id == team_id) {
            derived.apply_event(e.event_type);
        }

        match existing.iter().find(|s| s.player_id == player_id && s.team_id == team_id) {
            Some(current) => {
                let updated = PlayerStatistic {
                    goals: derived.goals,
                    assists: derived.assists,
                    yellow_cards: derived.yellow_cards.saturating_sub(current.served_yellows),
                    red_cards: derived.red_cards,
                    ..current.clone()
                };
                if updated != *current {
                    store.update(&updated)?;
                    written += 1;
                }
            }
            None => {
                store.insert(&derived)?;
                written += 1;
            }
        }
    }
    log::info!("Recomputed {} player statistic rows for {}", written, tournament_id);
    Ok(written)
}

/// Top scorers of a tournament: goals, then assists, both descending.
pub fn top_scorers<S: EntityStore>(
    store: &S,
    tournament_id: TournamentId,
    limit: usize,
) -> Result<Vec<PlayerStatistic>, TournamentError> {
    let mut stats = store.query(|s: &PlayerStatistic| s.tournament_id == tournament_id && s.goals > 0)?;
    stats.sort_by_key(|s| (Reverse(s.goals), Reverse(s.assists)));
    stats.truncate(limit);
    Ok(stats)
}
