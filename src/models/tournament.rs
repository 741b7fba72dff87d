//! Tournament, its format/lifecycle, and the domain error type.

use crate::store::{Record, StoreError, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// A policy precondition does not hold (e.g. groups not configured yet).
    PreconditionFailed(String),
    /// Uniqueness breach (duplicate draw, duplicate standing row, ...).
    ConstraintViolation(String),
    /// Every bracket position is taken.
    CapacityExceeded { capacity: u32 },
    /// Referenced tournament/team/match/event is missing.
    NotFound(String),
    /// The row changed between read and write; re-read and try again.
    Conflict(String),
    /// Opaque underlying storage failure.
    Store(String),
    /// Standings could not be exported.
    Export(String),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::PreconditionFailed(msg) => write!(f, "Precondition failed: {}", msg),
            TournamentError::ConstraintViolation(msg) => write!(f, "Constraint violation: {}", msg),
            TournamentError::CapacityExceeded { capacity } => {
                write!(f, "All {} bracket positions are taken", capacity)
            }
            TournamentError::NotFound(what) => write!(f, "{} not found", what),
            TournamentError::Conflict(msg) => write!(f, "Concurrent modification: {}", msg),
            TournamentError::Store(msg) => write!(f, "{}", msg),
            TournamentError::Export(msg) => write!(f, "Export failed: {}", msg),
        }
    }
}

impl std::error::Error for TournamentError {}

impl From<StoreError> for TournamentError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ConstraintViolation { .. } => TournamentError::ConstraintViolation(e.to_string()),
            StoreError::NotFound { .. } => TournamentError::NotFound(e.to_string()),
            StoreError::Conflict { .. } => TournamentError::Conflict(e.to_string()),
            StoreError::Backend(_) => TournamentError::Store(e.to_string()),
        }
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// How entrants are structured once drawn.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TournamentFormat {
    /// Group stage followed by a knockout bracket.
    #[default]
    GroupsKnockout,
    GroupsOnly,
    /// Single-elimination bracket only.
    Knockout,
    /// Everyone plays everyone; the draw only records registration.
    RoundRobin,
}

impl TournamentFormat {
    pub fn uses_groups(self) -> bool {
        matches!(self, TournamentFormat::GroupsKnockout | TournamentFormat::GroupsOnly)
    }
}

/// Lifecycle of a tournament. Only moves forward.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    Draft,
    RegistrationOpen,
    RegistrationClosed,
    InProgress,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    /// Bracket/group capacity ceiling.
    pub max_participants: u32,
    pub status: TournamentStatus,
    /// Zero for free tournaments.
    pub entry_fee_cents: u32,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a free tournament in Draft state.
    pub fn new(name: impl Into<String>, format: TournamentFormat, max_participants: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format,
            max_participants,
            status: TournamentStatus::Draft,
            entry_fee_cents: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_entry_fee(self, entry_fee_cents: u32) -> Self {
        Self { entry_fee_cents, ..self }
    }

    pub fn is_paid(&self) -> bool {
        self.entry_fee_cents > 0
    }
}

impl Record for Tournament {
    const TABLE: Table = Table::Tournaments;

    fn id(&self) -> Uuid {
        self.id
    }
}
