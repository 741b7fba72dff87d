//! Score entry: live goals and match finalization.

use crate::logic::fetch;
use crate::logic::suspensions::process_suspensions;
use crate::models::{
    GameMatch, Goal, GroupId, GroupStanding, MatchId, MatchStatus, Side, TeamId, TournamentError,
};
use crate::store::EntityStore;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct MatchFinalized {
    pub match_id: MatchId,
    pub standings_updated: usize,
    pub processed_players: usize,
}

/// Record a goal for `team_id` while the match is running and bump its score.
pub fn record_goal<S: EntityStore>(
    store: &S,
    match_id: MatchId,
    team_id: TeamId,
    minute: Option<u32>,
) -> Result<GameMatch, TournamentError> {
    let mut game: GameMatch = fetch(store, match_id, "Match")?;
    if game.is_completed() {
        return Err(TournamentError::PreconditionFailed("match is already completed".to_string()));
    }
    let side = game.side_of(team_id).ok_or_else(|| {
        TournamentError::PreconditionFailed(format!("team {} does not play in match {}", team_id, match_id))
    })?;

    store.insert(&Goal {
        id: Uuid::new_v4(),
        tournament_id: game.tournament_id,
        match_id,
        team_id,
        minute,
        recorded_at: Utc::now(),
    })?;
    let score = match side {
        Side::Home => &mut game.home_score,
        Side::Away => &mut game.away_score,
    };
    *score = Some(score.unwrap_or(0) + 1);
    if game.home_score.is_none() {
        game.home_score = Some(0);
    }
    if game.away_score.is_none() {
        game.away_score = Some(0);
    }
    store.update(&game)?;
    Ok(game)
}

/// Set the final score, fold it into both group standings, mark the match completed and
/// serve pending suspensions of both teams.
///
/// The match is marked completed only after both standings are written. If a standing
/// or the match write fails, standings already written are taken back so the call can
/// be retried.
pub fn finalize_match<S: EntityStore>(
    store: &S,
    match_id: MatchId,
    home_score: u32,
    away_score: u32,
) -> Result<MatchFinalized, TournamentError> {
    let mut game: GameMatch = fetch(store, match_id, "Match")?;
    if game.is_completed() {
        return Err(TournamentError::PreconditionFailed("match is already completed".to_string()));
    }

    let mut applied: Vec<(TeamId, u32, u32)> = Vec::new();
    let mut standings_updated = 0;
    if let Some(group_id) = game.group_id {
        let sides = [
            (game.home_team_id, home_score, away_score),
            (game.away_team_id, away_score, home_score),
        ];
        for (team_id, scored, conceded) in sides {
            match apply_result(store, group_id, team_id, scored, conceded) {
                Ok(rows) => standings_updated += rows,
                Err(e) => {
                    take_back(store, group_id, &applied);
                    return Err(e);
                }
            }
            applied.push((team_id, scored, conceded));
        }
    }

    game.home_score = Some(home_score);
    game.away_score = Some(away_score);
    game.status = MatchStatus::Completed;
    if let Err(e) = store.update(&game) {
        if let Some(group_id) = game.group_id {
            take_back(store, group_id, &applied);
        }
        return Err(e.into());
    }

    let suspensions = process_suspensions(store, match_id, game.tournament_id)?;
    log::info!(
        "Match {} finalized {}-{} ({} standings, {} suspensions)",
        match_id,
        home_score,
        away_score,
        standings_updated,
        suspensions.processed_players
    );
    Ok(MatchFinalized {
        match_id,
        standings_updated,
        processed_players: suspensions.processed_players,
    })
}

fn apply_result<S: EntityStore>(
    store: &S,
    group_id: GroupId,
    team_id: TeamId,
    scored: u32,
    conceded: u32,
) -> Result<usize, TournamentError> {
    let rows = store.query(|s: &GroupStanding| s.group_id == group_id && s.team_id == team_id)?;
    let count = rows.len();
    for mut standing in rows {
        standing.record_result(scored, conceded);
        store.update(&standing)?;
    }
    Ok(count)
}

/// Compensate standings written by a finalize that did not complete.
fn take_back<S: EntityStore>(store: &S, group_id: GroupId, applied: &[(TeamId, u32, u32)]) {
    for &(team_id, scored, conceded) in applied {
        let undone = store
            .query(|s: &GroupStanding| s.group_id == group_id && s.team_id == team_id)
            .and_then(|rows| {
                rows.into_iter().try_for_each(|mut standing| {
                    standing.revert_result(scored, conceded);
                    store.update(&standing)
                })
            });
        if let Err(e) = undone {
            log::error!(
                "Standing of team {} in group {} still counts an unfinished result: {}",
                team_id,
                group_id,
                e
            );
        }
    }
}
