//! In-memory store: JSON rows per table behind a lock.

use super::{EntityStore, Record, StoreError, Table};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Clone, Debug)]
struct StoredRow {
    id: Uuid,
    unique_keys: Vec<String>,
    version: Option<u64>,
    data: Value,
}

impl StoredRow {
    fn encode<R: Record>(row: &R) -> Result<Self, StoreError> {
        let data = serde_json::to_value(row).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Self {
            id: row.id(),
            unique_keys: row.unique_keys(),
            version: row.version(),
            data,
        })
    }

    fn decode<R: Record>(&self) -> Result<R, StoreError> {
        serde_json::from_value(self.data.clone()).map_err(|e| StoreError::Backend(e.to_string()))
    }
}

/// Thread-safe in-memory [`EntityStore`]. Rows keep insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, Vec<StoredRow>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Table, Vec<StoredRow>>>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Backend("lock error".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Table, Vec<StoredRow>>>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("lock error".to_string()))
    }
}

/// First unique key of `candidate` already held by a row other than `skip`.
fn duplicate_key(rows: &[StoredRow], candidate: &StoredRow, skip: Option<Uuid>) -> Option<String> {
    rows.iter()
        .filter(|r| Some(r.id) != skip)
        .flat_map(|r| r.unique_keys.iter())
        .find(|k| candidate.unique_keys.contains(k))
        .cloned()
}

impl EntityStore for MemoryStore {
    fn insert<R: Record>(&self, row: &R) -> Result<Uuid, StoreError> {
        let stored = StoredRow::encode(row)?;
        let mut tables = self.write()?;
        let rows = tables.entry(R::TABLE).or_default();
        if rows.iter().any(|r| r.id == stored.id) {
            return Err(StoreError::ConstraintViolation {
                table: R::TABLE,
                key: stored.id.to_string(),
            });
        }
        if let Some(key) = duplicate_key(rows, &stored, None) {
            return Err(StoreError::ConstraintViolation { table: R::TABLE, key });
        }
        let id = stored.id;
        rows.push(stored);
        Ok(id)
    }

    fn update<R: Record>(&self, row: &R) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let rows = tables.entry(R::TABLE).or_default();
        let idx = rows
            .iter()
            .position(|r| r.id == row.id())
            .ok_or(StoreError::NotFound { table: R::TABLE, id: row.id() })?;

        let mut next = row.clone();
        if let Some(version) = row.version() {
            if rows[idx].version != Some(version) {
                return Err(StoreError::Conflict { table: R::TABLE, id: row.id() });
            }
            next.set_version(version + 1);
        }
        let stored = StoredRow::encode(&next)?;
        if let Some(key) = duplicate_key(rows, &stored, Some(stored.id)) {
            return Err(StoreError::ConstraintViolation { table: R::TABLE, key });
        }
        rows[idx] = stored;
        Ok(())
    }

    fn delete_where<R: Record, F: Fn(&R) -> bool>(&self, filter: F) -> Result<usize, StoreError> {
        let mut tables = self.write()?;
        let rows = tables.entry(R::TABLE).or_default();
        // Decode everything first so a bad row cannot leave a half-applied delete.
        let doomed = rows
            .iter()
            .map(|r| r.decode::<R>().map(|rec| filter(&rec)))
            .collect::<Result<Vec<bool>, _>>()?;
        let before = rows.len();
        let mut flags = doomed.into_iter();
        rows.retain(|_| !flags.next().unwrap_or(false));
        Ok(before - rows.len())
    }

    fn query<R: Record, F: Fn(&R) -> bool>(&self, filter: F) -> Result<Vec<R>, StoreError> {
        let tables = self.read()?;
        let Some(rows) = tables.get(&R::TABLE) else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for row in rows {
            let rec: R = row.decode()?;
            if filter(&rec) {
                out.push(rec);
            }
        }
        Ok(out)
    }
}
