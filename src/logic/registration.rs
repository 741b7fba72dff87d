//! Registration: tournaments, teams, payment approval and lifecycle.

use crate::logic::draws::{on_payment_status_changed, DrawOutcome, PaymentStatusChange};
use crate::logic::fetch;
use crate::models::{
    Draw, GroupStanding, PaymentStatus, Team, TeamId, Tournament, TournamentError, TournamentFormat,
    TournamentId, TournamentStatus,
};
use crate::store::EntityStore;

/// Persist a new tournament.
pub fn create_tournament<S: EntityStore>(store: &S, tournament: Tournament) -> Result<Tournament, TournamentError> {
    if tournament.name.trim().is_empty() {
        return Err(TournamentError::PreconditionFailed("tournament name is empty".to_string()));
    }
    if tournament.max_participants < 2 {
        return Err(TournamentError::PreconditionFailed(
            "a tournament needs room for at least two teams".to_string(),
        ));
    }
    store.insert(&tournament)?;
    log::info!("Created tournament {} ({:?})", tournament.id, tournament.format);
    Ok(tournament)
}

/// Register a team (payment pending). Names are unique per tournament, case-insensitive.
pub fn register_team<S: EntityStore>(
    store: &S,
    tournament_id: TournamentId,
    name: &str,
    players_count: u32,
) -> Result<Team, TournamentError> {
    let tournament: Tournament = fetch(store, tournament_id, "Tournament")?;
    if tournament.status > TournamentStatus::RegistrationOpen {
        return Err(TournamentError::PreconditionFailed("registration is closed".to_string()));
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(TournamentError::PreconditionFailed("team name is empty".to_string()));
    }
    let is_duplicate = store.count(|t: &Team| {
        t.tournament_id == tournament_id && t.name.eq_ignore_ascii_case(name)
    })? > 0;
    if is_duplicate {
        return Err(TournamentError::ConstraintViolation(format!(
            "a team named {} is already registered",
            name
        )));
    }

    let team = Team {
        players_count,
        ..Team::new(tournament_id, name)
    };
    store.insert(&team)?;
    Ok(team)
}

/// Write a team's new payment status, then fire the draw trigger with old and new status.
pub fn set_payment_status<S: EntityStore>(
    store: &S,
    team_id: TeamId,
    status: PaymentStatus,
) -> Result<DrawOutcome, TournamentError> {
    let mut team: Team = fetch(store, team_id, "Team")?;
    let old = team.payment_status;
    team.payment_status = status;
    store.update(&team)?;
    log::info!("Team {} payment status {:?} -> {:?}", team_id, old, status);

    on_payment_status_changed(
        store,
        PaymentStatusChange {
            tournament_id: team.tournament_id,
            team_id,
            new_payment_status: status,
            old_payment_status: old,
        },
    )
}

/// Delete a team with its draw and standing rows.
/// Approved teams of paid tournaments cannot be deleted.
pub fn delete_team<S: EntityStore>(store: &S, team_id: TeamId) -> Result<(), TournamentError> {
    let team: Team = fetch(store, team_id, "Team")?;
    let tournament: Tournament = fetch(store, team.tournament_id, "Tournament")?;
    if tournament.is_paid() && team.is_approved() {
        return Err(TournamentError::PreconditionFailed(
            "approved teams of a paid tournament cannot be deleted".to_string(),
        ));
    }

    store.delete_where(|s: &GroupStanding| s.team_id == team_id)?;
    store.delete_where(|d: &Draw| d.team_id == team_id)?;
    store.delete_where(|t: &Team| t.id == team_id)?;
    log::info!("Deleted team {} from {}", team_id, tournament.id);
    Ok(())
}

/// Change the format. Not allowed once any draw exists.
pub fn change_format<S: EntityStore>(
    store: &S,
    tournament_id: TournamentId,
    format: TournamentFormat,
) -> Result<Tournament, TournamentError> {
    let mut tournament: Tournament = fetch(store, tournament_id, "Tournament")?;
    if store.count(|d: &Draw| d.tournament_id == tournament_id)? > 0 {
        return Err(TournamentError::PreconditionFailed(
            "format is fixed once draws exist".to_string(),
        ));
    }
    tournament.format = format;
    store.update(&tournament)?;
    Ok(tournament)
}

/// Move the lifecycle forward (draft -> registration_open -> ... -> completed).
pub fn advance_status<S: EntityStore>(
    store: &S,
    tournament_id: TournamentId,
    status: TournamentStatus,
) -> Result<Tournament, TournamentError> {
    let mut tournament: Tournament = fetch(store, tournament_id, "Tournament")?;
    if status <= tournament.status {
        return Err(TournamentError::PreconditionFailed(format!(
            "cannot move from {:?} to {:?}",
            tournament.status, status
        )));
    }
    tournament.status = status;
    store.update(&tournament)?;
    Ok(tournament)
}
