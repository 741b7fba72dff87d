//! Bracket Slotter: single-elimination positions, incremental and shuffled.

use crate::models::{Draw, Team, TeamId, Tournament, TournamentError, TournamentId};
use crate::store::EntityStore;
use rand::seq::SliceRandom;
use rand::Rng;

/// Power-of-two bracket size that fits `max_participants` (at least 2).
pub fn bracket_size(max_participants: u32) -> u32 {
    max_participants.max(2).next_power_of_two()
}

/// Name of the opening round for a bracket with `slots` positions.
pub fn round_name(slots: u32) -> &'static str {
    match slots {
        16.. => "Round of 16",
        8..=15 => "Quarterfinals",
        4..=7 => "Semifinals",
        _ => "Final",
    }
}

fn taken_positions<S: EntityStore>(store: &S, tournament_id: TournamentId) -> Result<Vec<u32>, TournamentError> {
    Ok(store
        .query(|d: &Draw| d.tournament_id == tournament_id)?
        .into_iter()
        .filter_map(|d| d.bracket_position)
        .collect())
}

/// Free positions in `1..=capacity`, ascending.
fn free_positions(taken: &[u32], capacity: u32) -> Vec<u32> {
    (1..=capacity).filter(|p| !taken.contains(p)).collect()
}

/// Give one team the smallest unused position.
pub(crate) fn assign_bracket_slot<S: EntityStore>(
    store: &S,
    tournament: &Tournament,
    team_id: TeamId,
) -> Result<Draw, TournamentError> {
    let taken = taken_positions(store, tournament.id)?;
    let position = free_positions(&taken, tournament.max_participants)
        .first()
        .copied()
        .ok_or(TournamentError::CapacityExceeded {
            capacity: tournament.max_participants,
        })?;

    let draw = Draw::into_bracket(tournament.id, team_id, position);
    store.insert(&draw)?;
    log::info!("Team {} drawn into bracket position {} ({})", team_id, position, tournament.id);
    Ok(draw)
}

/// Shuffle the first `teams.len()` free positions and hand one to each team.
/// With no earlier draws that is a uniform permutation of `1..=N`.
pub(crate) fn populate_bracket<S: EntityStore, R: Rng + ?Sized>(
    store: &S,
    rng: &mut R,
    tournament: &Tournament,
    teams: Vec<Team>,
) -> Result<(usize, usize), TournamentError> {
    let taken = taken_positions(store, tournament.id)?;
    let free = free_positions(&taken, tournament.max_participants);
    if teams.len() > free.len() {
        return Err(TournamentError::CapacityExceeded {
            capacity: tournament.max_participants,
        });
    }

    let mut positions: Vec<u32> = free.into_iter().take(teams.len()).collect();
    positions.shuffle(rng);

    let mut processed = 0;
    let mut skipped = 0;
    for (team, position) in teams.iter().zip(positions) {
        match store.insert(&Draw::into_bracket(tournament.id, team.id, position)) {
            Ok(_) => processed += 1,
            Err(e) => {
                let e = TournamentError::from(e);
                if let TournamentError::ConstraintViolation(msg) = &e {
                    log::warn!("Skipping team {} in bulk bracket draw: {}", team.id, msg);
                    skipped += 1;
                    continue;
                }
                log::error!(
                    "Bulk bracket draw for {} stopped after {} teams: {}",
                    tournament.id,
                    processed,
                    e
                );
                return Err(e);
            }
        }
    }
    Ok((processed, skipped))
}
