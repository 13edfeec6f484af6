//! SQLite-backed string store
//!
//! One row per key, JSON text as the value. Reads and writes are
//! fail-soft: a read that cannot be served falls back to the caller's
//! default and a write that cannot be committed is logged and dropped,
//! so callers never handle storage errors in normal operation. Only
//! opening the store is fallible.

use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{error, warn};

use super::watch::{Fanout, StoreEvent};
use crate::error::Result;

/// SQL to create the key-value table
const CREATE_STORE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS avtotest_store (
    key             TEXT NOT NULL PRIMARY KEY,
    value           TEXT NOT NULL
)
"#;

/// Key-value store with a single serialized writer.
///
/// All handles share one connection behind a mutex, so each
/// read-modify-write in [`Store::update`] observes and commits a
/// consistent value. Committed changes are fanned out to subscribers.
pub struct Store {
    /// Path to the store file
    path: PathBuf,
    /// SQLite connection, one writer at a time
    conn: Mutex<Connection>,
    /// Change event fan-out
    watcher: Fanout<StoreEvent>,
}

impl Store {
    /// Open (or create) a store at the specified path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute(CREATE_STORE_TABLE, [])?;
        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
            watcher: Fanout::new(),
        })
    }

    /// Get the store file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a JSON value under a key, falling back to `default` when
    /// the key is absent or its value does not parse.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = {
            let conn = self.lock();
            Self::read_value(&conn, key)
        };
        match raw {
            None => default,
            Some(text) => match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(err) => {
                    warn!("discarding unreadable value under key {key}: {err}");
                    default
                }
            },
        }
    }

    /// Write a value under a key as JSON. Failures are logged and the
    /// previous value stays in place.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(err) => {
                error!("failed to serialize value for key {key}: {err}");
                return;
            }
        };
        let written = {
            let conn = self.lock();
            Self::write_value(&conn, key, &json)
        };
        if written {
            self.notify(key);
        }
    }

    /// Read the stored string under a key without JSON decoding.
    ///
    /// A few keys (theme, language) hold bare strings rather than JSON
    /// documents and must be read back exactly as written.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        let conn = self.lock();
        Self::read_value(&conn, key)
    }

    /// Write a bare string under a key without JSON encoding
    pub fn set_raw(&self, key: &str, value: &str) {
        let written = {
            let conn = self.lock();
            Self::write_value(&conn, key, value)
        };
        if written {
            self.notify(key);
        }
    }

    /// Check whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        let conn = self.lock();
        conn.query_row(
            "SELECT 1 FROM avtotest_store WHERE key = ?1",
            params![key],
            |_row| Ok(()),
        )
        .is_ok()
    }

    /// Remove a key. Subscribers are notified only if a row was
    /// actually deleted.
    pub fn remove(&self, key: &str) {
        let removed = {
            let conn = self.lock();
            conn.execute("DELETE FROM avtotest_store WHERE key = ?1", params![key])
        };
        match removed {
            Ok(0) => {}
            Ok(_) => self.notify(key),
            Err(err) => error!("failed to remove key {key}: {err}"),
        }
    }

    /// Read-modify-write a JSON value under a key in one step.
    ///
    /// The closure runs on the current value (or `default` when the key
    /// is absent or unreadable) while the writer lock is held, so no
    /// other handle can interleave. The closure's return value is
    /// passed through. When the closure leaves the serialized value
    /// unchanged nothing is written and no event is published.
    pub fn update<T, R, F>(&self, key: &str, default: T, apply: F) -> R
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T) -> R,
    {
        let (result, written) = {
            let conn = self.lock();
            let raw = Self::read_value(&conn, key);
            let mut value: T = match raw.as_deref() {
                None => default,
                Some(text) => match serde_json::from_str(text) {
                    Ok(value) => value,
                    Err(err) => {
                        warn!("discarding unreadable value under key {key}: {err}");
                        default
                    }
                },
            };

            let result = apply(&mut value);

            match serde_json::to_string(&value) {
                Ok(json) if raw.as_deref() == Some(json.as_str()) => (result, false),
                Ok(json) => (result, Self::write_value(&conn, key, &json)),
                Err(err) => {
                    error!("failed to serialize value for key {key}: {err}");
                    (result, false)
                }
            }
        };

        if written {
            self.notify(key);
        }
        result
    }

    /// Subscribe to change events for all keys
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        self.watcher.subscribe()
    }

    fn notify(&self, key: &str) {
        self.watcher.publish(StoreEvent {
            key: key.to_string(),
        });
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_value(conn: &Connection, key: &str) -> Option<String> {
        conn.query_row(
            "SELECT value FROM avtotest_store WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .ok()
    }

    fn write_value(conn: &Connection, key: &str, value: &str) -> bool {
        let result = conn.execute(
            "INSERT OR REPLACE INTO avtotest_store (key, value) VALUES (?1, ?2)",
            params![key, value],
        );
        match result {
            Ok(_) => true,
            Err(err) => {
                error!("failed to write key {key}: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::mpsc::TryRecvError;
    use std::thread;
    use tempfile::TempDir;

    fn create_test_store() -> (Store, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(&temp_dir.path().join("test.dat")).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_store_path() {
        let (store, dir) = create_test_store();
        assert_eq!(store.path(), dir.path().join("test.dat"));
    }

    #[test]
    fn test_set_and_get_roundtrip() {
        let (store, _dir) = create_test_store();

        store.set("numbers", &vec![1, 2, 3]);
        let numbers: Vec<i32> = store.get("numbers", Vec::new());
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_get_missing_key_returns_default() {
        let (store, _dir) = create_test_store();

        let value: Vec<String> = store.get("absent", vec!["fallback".to_string()]);
        assert_eq!(value, vec!["fallback".to_string()]);
    }

    #[test]
    fn test_get_unparseable_value_returns_default() {
        let (store, _dir) = create_test_store();

        store.set_raw("broken", "{not json at all");
        let value: Vec<i32> = store.get("broken", vec![7]);
        assert_eq!(value, vec![7]);
    }

    #[test]
    fn test_raw_values_bypass_json() {
        let (store, _dir) = create_test_store();

        store.set_raw("theme", "dark");
        assert_eq!(store.get_raw("theme"), Some("dark".to_string()));

        // A JSON read of the same key would see a parse error
        let as_json: Option<String> = store.get("theme", None);
        assert_eq!(as_json, None);
    }

    #[test]
    fn test_contains() {
        let (store, _dir) = create_test_store();

        assert!(!store.contains("k"));
        store.set("k", &1);
        assert!(store.contains("k"));
    }

    #[test]
    fn test_remove() {
        let (store, _dir) = create_test_store();

        store.set("k", &1);
        store.remove("k");
        assert!(!store.contains("k"));
        assert_eq!(store.get("k", 0), 0);
    }

    #[test]
    fn test_set_publishes_event() {
        let (store, _dir) = create_test_store();
        let events = store.subscribe();

        store.set("avtotest_users", &Vec::<i32>::new());

        assert_eq!(events.try_recv().unwrap().key, "avtotest_users");
    }

    #[test]
    fn test_remove_publishes_only_when_present() {
        let (store, _dir) = create_test_store();
        let events = store.subscribe();

        store.remove("missing");
        assert_eq!(events.try_recv().unwrap_err(), TryRecvError::Empty);

        store.set("k", &1);
        store.remove("k");
        assert_eq!(events.try_recv().unwrap().key, "k");
        assert_eq!(events.try_recv().unwrap().key, "k");
        assert_eq!(events.try_recv().unwrap_err(), TryRecvError::Empty);
    }

    #[test]
    fn test_update_mutates_in_place() {
        let (store, _dir) = create_test_store();

        store.set("list", &vec![1, 2]);
        let len = store.update("list", Vec::new(), |list: &mut Vec<i32>| {
            list.push(3);
            list.len()
        });
        assert_eq!(len, 3);

        let list: Vec<i32> = store.get("list", Vec::new());
        assert_eq!(list, vec![1, 2, 3]);
    }

    #[test]
    fn test_update_starts_from_default_when_absent() {
        let (store, _dir) = create_test_store();

        store.update("fresh", Vec::new(), |list: &mut Vec<i32>| list.push(1));
        let list: Vec<i32> = store.get("fresh", Vec::new());
        assert_eq!(list, vec![1]);
    }

    #[test]
    fn test_update_skips_write_when_unchanged() {
        let (store, _dir) = create_test_store();
        store.set("list", &vec![1, 2]);

        let events = store.subscribe();
        store.update("list", Vec::new(), |_list: &mut Vec<i32>| {});

        assert_eq!(events.try_recv().unwrap_err(), TryRecvError::Empty);
    }

    #[test]
    fn test_update_recovers_from_corrupt_value() {
        let (store, _dir) = create_test_store();

        store.set_raw("list", "garbage");
        store.update("list", Vec::new(), |list: &mut Vec<i32>| list.push(5));

        let list: Vec<i32> = store.get("list", Vec::new());
        assert_eq!(list, vec![5]);
    }

    #[test]
    fn test_concurrent_updates_are_serialized() {
        let (store, _dir) = create_test_store();
        let store = Arc::new(store);

        // Every increment must survive; a writer that reads before
        // another writer commits would lose updates
        let writers: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..50 {
                        store.update("counter", 0i64, |count: &mut i64| *count += 1);
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        assert_eq!(store.get("counter", 0i64), 400);
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.dat");

        {
            let store = Store::open(&path).unwrap();
            store.set("k", &"persisted".to_string());
        }

        let store = Store::open(&path).unwrap();
        assert_eq!(store.get("k", String::new()), "persisted");
    }
}
