//! Durable key-value snapshot storage.
//!
//! The demo session is persisted as a single whole-record value under one
//! key -- no partial updates, no transactions, no migration beyond table
//! creation. A missing or unreadable record is never fatal to callers;
//! the orchestrator treats it as "no session".

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StoreError;

use super::data_dir;

/// Durable key-value store consumed by the orchestrator.
///
/// `set` has overwrite-whole-record semantics. Implementations are
/// expected to be cheap enough to call on every state transition.
pub trait SnapshotStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// SQLite-backed store at `~/.config/wuxing/wuxing.db`.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the database, creating the file and schema if needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?
            .join("wuxing.db");
        let conn = Connection::open(&path).map_err(|source| StoreError::OpenFailed {
            path,
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl SnapshotStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// In-memory store for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: std::collections::HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_roundtrip() {
        let mut store = SqliteStore::open_memory().unwrap();
        assert_eq!(store.get("demo.session").unwrap(), None);

        store.set("demo.session", "{\"state\":\"inactive\"}").unwrap();
        assert_eq!(
            store.get("demo.session").unwrap().as_deref(),
            Some("{\"state\":\"inactive\"}")
        );

        store.set("demo.session", "{}").unwrap();
        assert_eq!(store.get("demo.session").unwrap().as_deref(), Some("{}"));

        store.remove("demo.session").unwrap();
        assert_eq!(store.get("demo.session").unwrap(), None);
    }

    #[test]
    fn remove_missing_key_is_noop() {
        let mut store = SqliteStore::open_memory().unwrap();
        store.remove("never.there").unwrap();
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
