//! Team (tournament entrant) and its payment status.

use crate::models::tournament::TournamentId;
use crate::store::{Record, Table};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team.
pub type TeamId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// A team registered for exactly one tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub tournament_id: TournamentId,
    pub name: String,
    pub payment_status: PaymentStatus,
    pub players_count: u32,
}

impl Team {
    /// New registration, payment pending.
    pub fn new(tournament_id: TournamentId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: name.into(),
            payment_status: PaymentStatus::Pending,
            players_count: 0,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.payment_status == PaymentStatus::Approved
    }
}

impl Record for Team {
    const TABLE: Table = Table::Teams;

    fn id(&self) -> Uuid {
        self.id
    }
}
