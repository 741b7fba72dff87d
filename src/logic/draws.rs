//! Draw Trigger: fire a draw exactly once when a team's payment becomes approved,
//! and the operator's bulk "populate draws".

use crate::logic::{bracket, fetch, groups};
use crate::models::{
    Draw, PaymentStatus, Team, TeamId, Tournament, TournamentError, TournamentFormat, TournamentId,
};
use crate::store::EntityStore;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Payload of the trigger entry point.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
pub struct PaymentStatusChange {
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
    pub new_payment_status: PaymentStatus,
    pub old_payment_status: PaymentStatus,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DrawOutcome {
    pub drawn: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DrawOutcome {
    fn drawn() -> Self {
        Self { drawn: true, reason: None }
    }

    fn skipped(reason: &str) -> Self {
        Self {
            drawn: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// Result of a bulk draw. `teams_skipped` counts teams another path drew meanwhile.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct PopulateSummary {
    pub teams_processed: usize,
    pub teams_skipped: usize,
}

/// Entry point for payment status changes. Only a transition *into* approved draws.
pub fn on_payment_status_changed<S: EntityStore>(
    store: &S,
    change: PaymentStatusChange,
) -> Result<DrawOutcome, TournamentError> {
    if change.new_payment_status != PaymentStatus::Approved
        || change.old_payment_status == PaymentStatus::Approved
    {
        return Ok(DrawOutcome::skipped("payment status did not transition to approved"));
    }
    draw_team(store, change.tournament_id, change.team_id)
}

/// Draw one team according to the tournament format. Idempotent per (tournament, team).
pub fn draw_team<S: EntityStore>(
    store: &S,
    tournament_id: TournamentId,
    team_id: TeamId,
) -> Result<DrawOutcome, TournamentError> {
    let tournament: Tournament = fetch(store, tournament_id, "Tournament")?;
    let team: Team = fetch(store, team_id, "Team")?;
    if team.tournament_id != tournament_id {
        return Err(TournamentError::NotFound(format!(
            "Team {} in tournament {}",
            team_id, tournament_id
        )));
    }

    let already = store.count(|d: &Draw| d.tournament_id == tournament_id && d.team_id == team_id)?;
    if already > 0 {
        log::debug!("Team {} already drawn in {}", team_id, tournament_id);
        return Ok(DrawOutcome::skipped("team already drawn"));
    }

    let result = match tournament.format {
        TournamentFormat::GroupsKnockout | TournamentFormat::GroupsOnly => {
            groups::assign_team_to_group(store, &tournament, team_id)
        }
        TournamentFormat::Knockout => bracket::assign_bracket_slot(store, &tournament, team_id),
        TournamentFormat::RoundRobin => {
            let draw = Draw::registration_marker(tournament_id, team_id);
            store.insert(&draw).map(|_| draw).map_err(TournamentError::from)
        }
    };

    match result {
        Ok(_) => Ok(DrawOutcome::drawn()),
        // Lost a race against another draw for the same team; the unique key held.
        Err(TournamentError::ConstraintViolation(msg)) if msg.contains(&team_id.to_string()) => {
            log::warn!("Concurrent draw for team {}: {}", team_id, msg);
            Ok(DrawOutcome::skipped("team already drawn"))
        }
        Err(e) => Err(e),
    }
}

/// Draw every approved team that has no draw yet, in one shuffled pass.
///
/// Requires at least two approved teams in the tournament. When all of them are already
/// drawn this is a no-op with `teams_processed == 0`.
pub fn populate_draws<S: EntityStore, R: Rng + ?Sized>(
    store: &S,
    rng: &mut R,
    tournament_id: TournamentId,
) -> Result<PopulateSummary, TournamentError> {
    let tournament: Tournament = fetch(store, tournament_id, "Tournament")?;
    let approved = store.query(|t: &Team| t.tournament_id == tournament_id && t.is_approved())?;
    if approved.len() < 2 {
        return Err(TournamentError::PreconditionFailed(
            "at least two approved teams are needed for a random draw".to_string(),
        ));
    }

    let drawn: HashSet<TeamId> = store
        .query(|d: &Draw| d.tournament_id == tournament_id)?
        .into_iter()
        .map(|d| d.team_id)
        .collect();
    let undrawn: Vec<Team> = approved.into_iter().filter(|t| !drawn.contains(&t.id)).collect();
    if undrawn.is_empty() {
        return Ok(PopulateSummary::default());
    }

    let (teams_processed, teams_skipped) = match tournament.format {
        TournamentFormat::GroupsKnockout | TournamentFormat::GroupsOnly => {
            groups::populate_groups(store, rng, &tournament, undrawn)?
        }
        TournamentFormat::Knockout => bracket::populate_bracket(store, rng, &tournament, undrawn)?,
        TournamentFormat::RoundRobin => {
            let mut processed = 0;
            for team in &undrawn {
                store.insert(&Draw::registration_marker(tournament_id, team.id))?;
                processed += 1;
            }
            (processed, 0)
        }
    };

    log::info!(
        "Populated draws for {}: {} processed, {} skipped",
        tournament_id,
        teams_processed,
        teams_skipped
    );
    Ok(PopulateSummary {
        teams_processed,
        teams_skipped,
    })
}
