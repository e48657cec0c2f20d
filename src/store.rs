use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::tracker::TrackedSet;

/// Well-known key for the single tracked-set record (single-tenant store).
const TRACKED_SET_KEY: &str = "lol_tracked_matches";

/// Thread-safe SQLite-backed cache (single connection with mutex).
///
/// The whole tracked set is serialized as one JSON value under a fixed key,
/// so a save replaces the set and its timestamp in one atomic row write.
#[derive(Clone)]
pub struct CacheStore {
    conn: Arc<Mutex<Connection>>,
}

impl CacheStore {
    /// Open (or create) the cache database at the given path.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open cache database at {}", path))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let store = CacheStore {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    /// In-memory store, mainly for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = CacheStore {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    /// Persist the full tracked set under the well-known key.
    pub fn save(&self, set: &TrackedSet) -> Result<()> {
        let value = serde_json::to_string(set).context("Failed to serialize tracked set")?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO cache (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![TRACKED_SET_KEY, value],
        )?;
        info!("Cache saved: {} tracked matches", set.matches.len());
        Ok(())
    }

    /// Load the tracked set, or `None` if nothing has been saved yet.
    pub fn load(&self) -> Result<Option<TrackedSet>> {
        let conn = self.conn.lock().unwrap();
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM cache WHERE key = ?1",
                params![TRACKED_SET_KEY],
                |row| row.get(0),
            )
            .optional()?;
        match value {
            Some(json) => {
                let set: TrackedSet =
                    serde_json::from_str(&json).context("Failed to deserialize tracked set")?;
                Ok(Some(set))
            }
            None => Ok(None),
        }
    }
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS cache (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{MatchStatus, TeamSlot, TrackedMatch};

    fn sample_set() -> TrackedSet {
        TrackedSet {
            matches: vec![TrackedMatch {
                id: Some(42),
                tournament: Some("LEC - Summer 2024".to_string()),
                teams: vec![TeamSlot {
                    id: Some(1),
                    name: Some("G2".to_string()),
                    logo: None,
                    score: Some(1),
                }],
                begin_at_utc: Some("2024-06-01T15:00:00Z".to_string()),
                begin_at_local: None,
                begin_at_local_human: None,
                status: Some(MatchStatus::Running),
                status_label: Some("En cours".to_string()),
                best_of: None,
                last_update: "2024-06-01T17:10:00+02:00".to_string(),
            }],
            last_refresh: Some("2024-06-01T06:00:00+02:00".to_string()),
        }
    }

    #[test]
    fn test_load_empty_store() {
        let store = CacheStore::open_in_memory().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let store = CacheStore::open_in_memory().unwrap();
        let set = sample_set();
        store.save(&set).unwrap();
        assert_eq!(store.load().unwrap(), Some(set));
    }

    #[test]
    fn test_save_replaces_previous_value() {
        let store = CacheStore::open_in_memory().unwrap();
        store.save(&sample_set()).unwrap();

        let empty = TrackedSet {
            matches: vec![],
            last_refresh: Some("2024-06-02T06:00:00+02:00".to_string()),
        };
        store.save(&empty).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert!(loaded.matches.is_empty());
        assert_eq!(
            loaded.last_refresh.as_deref(),
            Some("2024-06-02T06:00:00+02:00")
        );
    }
}
