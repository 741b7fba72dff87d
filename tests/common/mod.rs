//! Test store that fails writes to one table on demand.

#![allow(dead_code)]

use std::cell::Cell;
use tournament_engine::{EntityStore, MemoryStore, Record, StoreError, Table};
use uuid::Uuid;

#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    table: Cell<Option<Table>>,
    passes: Cell<usize>,
    failures: Cell<usize>,
}

impl FlakyStore {
    /// Let `passes` writes to `table` through, then fail the next `failures` of them.
    pub fn fail_writes(&self, table: Table, passes: usize, failures: usize) {
        self.table.set(Some(table));
        self.passes.set(passes);
        self.failures.set(failures);
    }

    /// Fail every write to `table` until `recover`.
    pub fn break_table(&self, table: Table) {
        self.fail_writes(table, 0, usize::MAX);
    }

    pub fn recover(&self) {
        self.table.set(None);
    }

    fn check<R: Record>(&self) -> Result<(), StoreError> {
        if self.table.get() != Some(R::TABLE) {
            return Ok(());
        }
        if self.passes.get() > 0 {
            self.passes.set(self.passes.get() - 1);
            return Ok(());
        }
        if self.failures.get() > 0 {
            self.failures.set(self.failures.get() - 1);
            return Err(StoreError::Backend(format!("{} unavailable", R::TABLE.name())));
        }
        Ok(())
    }
}

impl EntityStore for FlakyStore {
    fn insert<R: Record>(&self, row: &R) -> Result<Uuid, StoreError> {
        self.check::<R>()?;
        self.inner.insert(row)
    }

    fn update<R: Record>(&self, row: &R) -> Result<(), StoreError> {
        self.check::<R>()?;
        self.inner.update(row)
    }

    fn delete_where<R: Record, F: Fn(&R) -> bool>(&self, filter: F) -> Result<usize, StoreError> {
        self.inner.delete_where(filter)
    }

    fn query<R: Record, F: Fn(&R) -> bool>(&self, filter: F) -> Result<Vec<R>, StoreError> {
        self.inner.query(filter)
    }
}
