//! Ledger entry storage.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use fintrack_core::EntryId;
use fintrack_ledger::{EntryKind, EntryPatch, LedgerEntry, MonthWindow};

use crate::error::{StoreError, StoreResult};

/// Persistent store of income/expense records.
///
/// `update`/`delete` are scoped to the owning username: an id belonging to a
/// different owner reads as [`StoreError::NotFound`]. Updates are
/// last-write-wins; there is no optimistic-concurrency check.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn insert(&self, entry: LedgerEntry) -> StoreResult<()>;

    /// Entries of `kind` owned by `username`, newest date first, optionally
    /// restricted to a month window.
    async fn list(
        &self,
        kind: EntryKind,
        username: &str,
        window: Option<MonthWindow>,
    ) -> StoreResult<Vec<LedgerEntry>>;

    async fn update(
        &self,
        kind: EntryKind,
        id: EntryId,
        username: &str,
        patch: EntryPatch,
    ) -> StoreResult<LedgerEntry>;

    async fn delete(&self, kind: EntryKind, id: EntryId, username: &str) -> StoreResult<()>;
}

/// In-memory ledger store for dev/test.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    inner: RwLock<HashMap<EntryId, LedgerEntry>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(entry: &LedgerEntry, kind: EntryKind, username: &str) -> bool {
    entry.kind == kind && entry.username == username
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn insert(&self, entry: LedgerEntry) -> StoreResult<()> {
        let mut entries = self.inner.write().map_err(|_| StoreError::backend("lock poisoned"))?;
        entries.insert(entry.id, entry);
        Ok(())
    }

    async fn list(
        &self,
        kind: EntryKind,
        username: &str,
        window: Option<MonthWindow>,
    ) -> StoreResult<Vec<LedgerEntry>> {
        let entries = self.inner.read().map_err(|_| StoreError::backend("lock poisoned"))?;

        let mut found: Vec<LedgerEntry> = entries
            .values()
            .filter(|e| matches(e, kind, username))
            .filter(|e| window.map_or(true, |w| w.contains(e.date)))
            .cloned()
            .collect();

        // Newest first; id as tie-breaker for a stable order.
        found.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.to_string().cmp(&a.id.to_string())));
        Ok(found)
    }

    async fn update(
        &self,
        kind: EntryKind,
        id: EntryId,
        username: &str,
        patch: EntryPatch,
    ) -> StoreResult<LedgerEntry> {
        let mut entries = self.inner.write().map_err(|_| StoreError::backend("lock poisoned"))?;
        let entry = entries
            .get_mut(&id)
            .filter(|e| matches(e, kind, username))
            .ok_or(StoreError::NotFound)?;

        patch.apply(entry);
        Ok(entry.clone())
    }

    async fn delete(&self, kind: EntryKind, id: EntryId, username: &str) -> StoreResult<()> {
        let mut entries = self.inner.write().map_err(|_| StoreError::backend("lock poisoned"))?;
        let owned = entries.get(&id).is_some_and(|e| matches(e, kind, username));
        if !owned {
            return Err(StoreError::NotFound);
        }
        entries.remove(&id);
        Ok(())
    }
}
