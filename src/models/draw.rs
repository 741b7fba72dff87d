//! Draw: the assignment of a team to a group or a bracket position.

use crate::models::group::GroupId;
use crate::models::team::TeamId;
use crate::models::tournament::TournamentId;
use crate::store::{Record, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a draw row.
pub type DrawId = Uuid;

/// At most one per (tournament, team). Carries a group XOR a bracket position;
/// round-robin draws carry neither.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Draw {
    pub id: DrawId,
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
    pub group_id: Option<GroupId>,
    pub bracket_position: Option<u32>,
    pub drawn_at: DateTime<Utc>,
}

impl Draw {
    fn new(tournament_id: TournamentId, team_id: TeamId) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            team_id,
            group_id: None,
            bracket_position: None,
            drawn_at: Utc::now(),
        }
    }

    pub fn into_group(tournament_id: TournamentId, team_id: TeamId, group_id: GroupId) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::new(tournament_id, team_id)
        }
    }

    pub fn into_bracket(tournament_id: TournamentId, team_id: TeamId, position: u32) -> Self {
        Self {
            bracket_position: Some(position),
            ..Self::new(tournament_id, team_id)
        }
    }

    /// Registration-only marker used by round-robin tournaments.
    pub fn registration_marker(tournament_id: TournamentId, team_id: TeamId) -> Self {
        Self::new(tournament_id, team_id)
    }
}

impl Record for Draw {
    const TABLE: Table = Table::Draws;

    fn id(&self) -> Uuid {
        self.id
    }

    fn unique_keys(&self) -> Vec<String> {
        let mut keys = vec![format!("team:{}:{}", self.tournament_id, self.team_id)];
        if let Some(pos) = self.bracket_position {
            keys.push(format!("slot:{}:{}", self.tournament_id, pos));
        }
        keys
    }
}
