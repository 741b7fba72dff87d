//! Tournament reset: wipe draws, matches and everything derived from them.

use crate::logic::fetch;
use crate::models::{
    Draw, GameMatch, Goal, GroupStanding, MatchEvent, PlayerStatistic, Tournament, TournamentError,
    TournamentId,
};
use crate::store::EntityStore;
use serde::Serialize;

/// Rows removed per table.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ResetSummary {
    pub match_events: usize,
    pub goals: usize,
    pub matches: usize,
    pub player_statistics: usize,
    pub group_standings: usize,
    pub draws: usize,
}

/// Delete, in dependency order: events, goals, matches, player statistics, standings, draws.
///
/// Every step is a delete-if-exists, so a reset that failed halfway is finished by
/// running it again. Groups themselves are kept.
pub fn reset_tournament<S: EntityStore>(
    store: &S,
    tournament_id: TournamentId,
) -> Result<ResetSummary, TournamentError> {
    let _: Tournament = fetch(store, tournament_id, "Tournament")?;
    let mut summary = ResetSummary::default();

    let result = (|| -> Result<(), TournamentError> {
        summary.match_events = store.delete_where(|e: &MatchEvent| e.tournament_id == tournament_id)?;
        summary.goals = store.delete_where(|g: &Goal| g.tournament_id == tournament_id)?;
        summary.matches = store.delete_where(|m: &GameMatch| m.tournament_id == tournament_id)?;
        summary.player_statistics =
            store.delete_where(|s: &PlayerStatistic| s.tournament_id == tournament_id)?;
        summary.group_standings =
            store.delete_where(|s: &GroupStanding| s.tournament_id == tournament_id)?;
        summary.draws = store.delete_where(|d: &Draw| d.tournament_id == tournament_id)?;
        Ok(())
    })();

    if let Err(e) = result {
        log::error!(
            "Reset of {} stopped part way ({:?}); run it again to finish: {}",
            tournament_id,
            summary,
            e
        );
        return Err(e);
    }
    log::info!("Reset tournament {}: {:?}", tournament_id, summary);
    Ok(summary)
}
