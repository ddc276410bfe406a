//! Counter store trait and its redb-backed implementation.
//!
//! Every operation runs in its own redb transaction, so each call is
//! atomic on its own. Callers that chain calls (read, then write) must not
//! run concurrently against the same key.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::FAILURES;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Key/counter store holding consecutive failure counts.
pub trait CounterStore: Send + Sync {
    /// Whether a counter exists for `key`.
    fn exists(&self, key: &str) -> StateResult<bool>;

    /// Current counter value, if any.
    fn get(&self, key: &str) -> StateResult<Option<u64>>;

    /// Overwrite the counter for `key`.
    fn set(&self, key: &str, value: u64) -> StateResult<()>;

    /// Add one to the counter (absent counts as 0) and return the new value.
    fn incr(&self, key: &str) -> StateResult<u64>;

    /// Remove the counter. Returns true if it existed.
    fn delete(&self, key: &str) -> StateResult<bool>;

    /// All counters, ordered by key.
    fn list(&self) -> StateResult<Vec<(String, u64)>>;
}

/// Thread-safe counter store backed by redb.
#[derive(Clone)]
pub struct RedbCounterStore {
    db: Arc<Database>,
}

impl RedbCounterStore {
    /// Open (or create) a persistent counter store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "counter store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory counter store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory counter store opened");
        Ok(store)
    }

    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(FAILURES).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Remove every counter. Returns the number removed.
    pub fn clear(&self) -> StateResult<u32> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let count;
        {
            let mut table = txn.open_table(FAILURES).map_err(map_err!(Table))?;
            let mut keys = Vec::new();
            for entry in table.iter().map_err(map_err!(Read))? {
                let (key, _) = entry.map_err(map_err!(Read))?;
                keys.push(key.value().to_string());
            }
            count = keys.len() as u32;
            for key in &keys {
                table.remove(key.as_str()).map_err(map_err!(Write))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(count, "counters cleared");
        Ok(count)
    }
}

impl CounterStore for RedbCounterStore {
    fn exists(&self, key: &str) -> StateResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    fn get(&self, key: &str) -> StateResult<Option<u64>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(FAILURES).map_err(map_err!(Table))?;
        let value = table.get(key).map_err(map_err!(Read))?.map(|g| g.value());
        Ok(value)
    }

    fn set(&self, key: &str, value: u64) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(FAILURES).map_err(map_err!(Table))?;
            table.insert(key, value).map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, value, "counter set");
        Ok(())
    }

    fn incr(&self, key: &str) -> StateResult<u64> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let next;
        {
            let mut table = txn.open_table(FAILURES).map_err(map_err!(Table))?;
            let current = table.get(key).map_err(map_err!(Read))?.map(|g| g.value());
            next = current.unwrap_or(0).saturating_add(1);
            table.insert(key, next).map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, value = next, "counter incremented");
        Ok(next)
    }

    fn delete(&self, key: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(FAILURES).map_err(map_err!(Table))?;
            existed = table.remove(key).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, existed, "counter deleted");
        Ok(existed)
    }

    fn list(&self) -> StateResult<Vec<(String, u64)>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(FAILURES).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (key, value) = entry.map_err(map_err!(Read))?;
            results.push((key.value().to_string(), value.value()));
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_key() {
        let store = RedbCounterStore::open_in_memory().unwrap();
        assert!(!store.exists("i-1").unwrap());
        assert_eq!(store.get("i-1").unwrap(), None);
        assert!(!store.delete("i-1").unwrap());
    }

    #[test]
    fn set_get_delete() {
        let store = RedbCounterStore::open_in_memory().unwrap();
        store.set("i-1", 1).unwrap();
        assert!(store.exists("i-1").unwrap());
        assert_eq!(store.get("i-1").unwrap(), Some(1));

        assert!(store.delete("i-1").unwrap());
        assert!(!store.exists("i-1").unwrap());
    }

    #[test]
    fn incr_from_absent_and_existing() {
        let store = RedbCounterStore::open_in_memory().unwrap();
        assert_eq!(store.incr("i-1").unwrap(), 1);
        assert_eq!(store.incr("i-1").unwrap(), 2);

        store.set("i-2", 5).unwrap();
        assert_eq!(store.incr("i-2").unwrap(), 6);
        assert_eq!(store.get("i-2").unwrap(), Some(6));
    }

    #[test]
    fn keys_are_independent() {
        let store = RedbCounterStore::open_in_memory().unwrap();
        store.set("i-1", 3).unwrap();
        store.incr("i-2").unwrap();
        store.delete("i-1").unwrap();
        assert_eq!(store.get("i-2").unwrap(), Some(1));
    }

    #[test]
    fn list_and_clear() {
        let store = RedbCounterStore::open_in_memory().unwrap();
        store.set("i-b", 2).unwrap();
        store.set("i-a", 1).unwrap();

        assert_eq!(
            store.list().unwrap(),
            vec![("i-a".to_string(), 1), ("i-b".to_string(), 2)]
        );

        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("counters.redb");

        {
            let store = RedbCounterStore::open(&db_path).unwrap();
            store.set("i-1", 1).unwrap();
            store.incr("i-1").unwrap();
        }

        let store = RedbCounterStore::open(&db_path).unwrap();
        assert_eq!(store.get("i-1").unwrap(), Some(2));
    }
}
