//! Suspension Processor: serve one match of suspension for players of both teams
//! once a match is completed.

use crate::logic::fetch;
use crate::models::{
    EventType, GameMatch, MatchEvent, MatchId, PlayerId, PlayerStatistic, TournamentError,
    TournamentId, YELLOW_CARD_LIMIT,
};
use crate::store::EntityStore;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspensionSummary {
    pub processed_players: usize,
}

/// Cards shown in this match, per player.
fn cards_in_match<S: EntityStore>(
    store: &S,
    game: &GameMatch,
) -> Result<Vec<(PlayerId, EventType)>, TournamentError> {
    Ok(store
        .query(|e: &MatchEvent| {
            e.match_id == game.id
                && matches!(e.event_type, EventType::YellowCard | EventType::RedCard)
        })?
        .into_iter()
        .map(|e| (e.player_id, e.event_type))
        .collect())
}

/// Whether this match's own cards set off the current suspension: a red here, or a
/// yellow here that brought the player to the accumulation limit. Such players serve
/// the next match, not this one.
fn triggered_here(stat: &PlayerStatistic, cards: &[(PlayerId, EventType)]) -> bool {
    cards.iter().any(|&(player_id, card)| {
        player_id == stat.player_id
            && match card {
                EventType::RedCard => true,
                EventType::YellowCard => stat.yellow_cards >= YELLOW_CARD_LIMIT,
                _ => false,
            }
    })
}

/// Decrement outstanding suspensions of players on the two teams of a completed match.
pub fn process_suspensions<S: EntityStore>(
    store: &S,
    match_id: MatchId,
    tournament_id: TournamentId,
) -> Result<SuspensionSummary, TournamentError> {
    let game: GameMatch = fetch(store, match_id, "Match")?;
    if game.tournament_id != tournament_id {
        return Err(TournamentError::NotFound(format!(
            "Match {} in tournament {}",
            match_id, tournament_id
        )));
    }
    if !game.is_completed() {
        return Err(TournamentError::PreconditionFailed(
            "suspensions are processed only for completed matches".to_string(),
        ));
    }

    let cards = cards_in_match(store, &game)?;
    let suspended = store.query(|s: &PlayerStatistic| {
        s.tournament_id == tournament_id
            && s.is_suspended
            && s.suspension_matches_remaining > 0
            && game.involves(s.team_id)
    })?;

    let mut processed = 0;
    for mut stat in suspended {
        if triggered_here(&stat, &cards) {
            log::debug!("Player {} was suspended in match {}; serves the next one", stat.player_id, match_id);
            continue;
        }
        if stat.serve_match() {
            log::info!("Player {} served suspension, available again", stat.player_id);
        }
        store.update(&stat)?;
        processed += 1;
    }
    Ok(SuspensionSummary {
        processed_players: processed,
    })
}
