//! Group Partitioner: group creation, incremental (least-populated) and bulk (shuffled) assignment.

use crate::logic::fetch;
use crate::models::{
    Draw, Group, GroupId, GroupStanding, Team, TeamId, Tournament, TournamentError, TournamentId,
};
use crate::store::EntityStore;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;

/// Result of `create_missing_groups`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct GroupsCreated {
    pub groups_created: usize,
}

/// Number of groups for a tournament capacity.
pub fn group_count_for(max_participants: u32) -> u32 {
    match max_participants {
        0..=8 => 2,
        9..=16 => 4,
        17..=24 => 4,
        25..=32 => 8,
        _ => 4,
    }
}

/// Seats per group (rounded up), used to render "TBD" placeholders.
pub fn group_capacity(max_participants: u32) -> u32 {
    let groups = group_count_for(max_participants);
    max_participants.div_ceil(groups)
}

/// Groups of a tournament in display order.
pub fn groups_of<S: EntityStore>(store: &S, tournament_id: TournamentId) -> Result<Vec<Group>, TournamentError> {
    let mut groups = store.query(|g: &Group| g.tournament_id == tournament_id)?;
    groups.sort_by_key(|g| g.display_order);
    Ok(groups)
}

/// Create "Group A", "Group B", ... once. A no-op returning 0 if any group already exists.
pub fn create_missing_groups<S: EntityStore>(
    store: &S,
    tournament_id: TournamentId,
) -> Result<GroupsCreated, TournamentError> {
    let tournament: Tournament = fetch(store, tournament_id, "Tournament")?;
    if !tournament.format.uses_groups() {
        return Err(TournamentError::PreconditionFailed(
            "tournament format has no group stage".to_string(),
        ));
    }
    if store.count(|g: &Group| g.tournament_id == tournament_id)? > 0 {
        return Ok(GroupsCreated { groups_created: 0 });
    }

    let count = group_count_for(tournament.max_participants);
    let mut created = 0;
    for order in 0..count {
        store.insert(&Group::new(tournament_id, order))?;
        created += 1;
    }
    log::info!("Created {} groups for tournament {}", created, tournament_id);
    Ok(GroupsCreated { groups_created: created })
}

/// Current member count per group, counted from draw rows.
fn member_counts<S: EntityStore>(
    store: &S,
    tournament_id: TournamentId,
) -> Result<HashMap<GroupId, usize>, TournamentError> {
    let mut counts = HashMap::new();
    for draw in store.query(|d: &Draw| d.tournament_id == tournament_id)? {
        if let Some(group_id) = draw.group_id {
            *counts.entry(group_id).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

fn write_membership<S: EntityStore>(
    store: &S,
    tournament_id: TournamentId,
    team_id: TeamId,
    group_id: GroupId,
) -> Result<Draw, TournamentError> {
    let draw = Draw::into_group(tournament_id, team_id, group_id);
    store.insert(&draw)?;
    if let Err(e) = store.insert(&GroupStanding::new(tournament_id, group_id, team_id)) {
        log::warn!("Standing for team {} not written, withdrawing draw: {}", team_id, e);
        if let Err(undo) = store.delete_where(|d: &Draw| d.id == draw.id) {
            log::error!("Draw {} kept without a standing row: {}", draw.id, undo);
        }
        return Err(e.into());
    }
    Ok(draw)
}

/// Put one newly approved team into the least-populated group (first in display order on ties).
pub(crate) fn assign_team_to_group<S: EntityStore>(
    store: &S,
    tournament: &Tournament,
    team_id: TeamId,
) -> Result<Draw, TournamentError> {
    let groups = groups_of(store, tournament.id)?;
    let counts = member_counts(store, tournament.id)?;
    let group = groups
        .iter()
        .min_by_key(|g| counts.get(&g.id).copied().unwrap_or(0))
        .ok_or_else(|| TournamentError::PreconditionFailed("groups not configured".to_string()))?;

    let draw = write_membership(store, tournament.id, team_id, group.id)?;
    log::info!("Team {} drawn into {} ({})", team_id, group.name, tournament.id);
    Ok(draw)
}

/// Shuffle `teams` and deal them one by one to the least-filled group (display order on
/// ties). Into empty groups this is the plain `i mod groups` deal; after incremental
/// draws it tops up the emptier groups first.
/// Returns (processed, skipped); a team skipped here was drawn concurrently by another path.
pub(crate) fn populate_groups<S: EntityStore, R: Rng + ?Sized>(
    store: &S,
    rng: &mut R,
    tournament: &Tournament,
    mut teams: Vec<Team>,
) -> Result<(usize, usize), TournamentError> {
    let groups = groups_of(store, tournament.id)?;
    if groups.is_empty() {
        return Err(TournamentError::PreconditionFailed("groups not configured".to_string()));
    }
    let mut counts = member_counts(store, tournament.id)?;

    teams.shuffle(rng);
    let mut processed = 0;
    let mut skipped = 0;
    for team in &teams {
        let Some(group) = groups
            .iter()
            .min_by_key(|g| counts.get(&g.id).copied().unwrap_or(0))
        else {
            break;
        };
        match write_membership(store, tournament.id, team.id, group.id) {
            Ok(_) => {
                *counts.entry(group.id).or_insert(0) += 1;
                processed += 1;
            }
            Err(TournamentError::ConstraintViolation(msg)) => {
                log::warn!("Skipping team {} in bulk draw: {}", team.id, msg);
                skipped += 1;
            }
            Err(e) => {
                log::error!(
                    "Bulk group draw for {} stopped after {} teams: {}",
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_table() {
        assert_eq!(group_count_for(6), 2);
        assert_eq!(group_count_for(8), 2);
        assert_eq!(group_count_for(12), 4);
        assert_eq!(group_count_for(16), 4);
        assert_eq!(group_count_for(24), 4);
        assert_eq!(group_count_for(32), 8);
        assert_eq!(group_count_for(64), 4);
    }

    #[test]
    fn capacity_rounds_up() {
        assert_eq!(group_capacity(16), 4);
        assert_eq!(group_capacity(10), 3);
    }
}
