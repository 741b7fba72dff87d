//! Entity Store seam: typed rows with uniqueness constraints, and the in-memory backend.
//!
//! Logic functions are generic over [`EntityStore`] so that a hosted backend can be
//! dropped in without touching the draw, ledger or standings code.

mod memory;

pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tables known to the store.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Tournaments,
    Teams,
    Groups,
    GroupStandings,
    Draws,
    Matches,
    Goals,
    MatchEvents,
    PlayerStatistics,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Tournaments => "tournaments",
            Table::Teams => "teams",
            Table::Groups => "groups",
            Table::GroupStandings => "group_teams",
            Table::Draws => "draws",
            Table::Matches => "matches",
            Table::Goals => "goals",
            Table::MatchEvents => "match_events",
            Table::PlayerStatistics => "player_statistics",
        }
    }
}

/// Errors surfaced by a store implementation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreError {
    /// A uniqueness constraint (or primary key) would be breached.
    ConstraintViolation { table: Table, key: String },
    /// No row with this id.
    NotFound { table: Table, id: Uuid },
    /// The row was modified since it was read (version mismatch).
    Conflict { table: Table, id: Uuid },
    /// Opaque backend failure.
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::ConstraintViolation { table, key } => {
                write!(f, "Duplicate key {} in {}", key, table.name())
            }
            StoreError::NotFound { table, id } => write!(f, "No row {} in {}", id, table.name()),
            StoreError::Conflict { table, id } => {
                write!(f, "Row {} in {} was modified concurrently", id, table.name())
            }
            StoreError::Backend(msg) => write!(f, "Store failure: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// A row type persisted in one table.
pub trait Record: Clone + Serialize + DeserializeOwned {
    const TABLE: Table;

    fn id(&self) -> Uuid;

    /// Keys that must be unique within the table (besides the id).
    fn unique_keys(&self) -> Vec<String> {
        Vec::new()
    }

    /// Row version for optimistic concurrency; `None` for unversioned tables.
    fn version(&self) -> Option<u64> {
        None
    }

    fn set_version(&mut self, _version: u64) {}
}

/// CRUD + filtered queries over typed rows.
///
/// Rows come back in insertion order; callers sort when they need another order.
pub trait EntityStore {
    /// Insert a row. Fails with `ConstraintViolation` on a duplicate id or unique key.
    fn insert<R: Record>(&self, row: &R) -> Result<Uuid, StoreError>;

    /// Replace the row with the same id. Fails with `NotFound` if absent and with
    /// `Conflict` when a versioned row no longer carries the stored version.
    fn update<R: Record>(&self, row: &R) -> Result<(), StoreError>;

    /// Delete every row matching `filter`, returning how many were removed.
    fn delete_where<R: Record, F: Fn(&R) -> bool>(&self, filter: F) -> Result<usize, StoreError>;

    fn query<R: Record, F: Fn(&R) -> bool>(&self, filter: F) -> Result<Vec<R>, StoreError>;

    fn count<R: Record, F: Fn(&R) -> bool>(&self, filter: F) -> Result<usize, StoreError> {
        Ok(self.query(filter)?.len())
    }

    fn get<R: Record>(&self, id: Uuid) -> Result<Option<R>, StoreError> {
        Ok(self.query(|r: &R| r.id() == id)?.into_iter().next())
    }
}
