//! Key-value collection storage on SQLite
//!
//! Each collection is one JSON document stored under a fixed key. Reads load
//! the whole collection, writes replace it.

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CoreResult;

pub const WORD_SETS: &str = "word_sets";
pub const STUDY_SESSIONS: &str = "study_sessions";
pub const STUDY_RESULTS: &str = "study_results";
pub const TEST_RESULTS: &str = "test_results";
pub const STUDY_STATS: &str = "study_stats";
pub const USER_SETTINGS: &str = "user_settings";
pub const APP_VERSION: &str = "app_version";

/// Every key owned by the app, in the order they are cleared
pub const ALL_KEYS: [&str; 7] = [
    WORD_SETS,
    STUDY_SESSIONS,
    STUDY_RESULTS,
    TEST_RESULTS,
    STUDY_STATS,
    USER_SETTINGS,
    APP_VERSION,
];

fn create_schema(conn: &Connection) -> CoreResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // Version is informational only; nothing migrates on it yet
    conn.execute(
        "INSERT OR IGNORE INTO kv_store (key, value) VALUES (?1, ?2)",
        params![APP_VERSION, serde_json::to_string(env!("CARGO_PKG_VERSION"))?],
    )?;
    Ok(())
}

/// Open (creating if needed) the database file and its schema
pub fn init_database(db_path: &str) -> CoreResult<Connection> {
    let conn = Connection::open(db_path)?;
    create_schema(&conn)?;
    log::debug!("Opened key-value store at {}", db_path);
    Ok(conn)
}

/// In-memory store, used by tests and throwaway sessions
pub fn init_in_memory() -> CoreResult<Connection> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Read and deserialize one key. Missing keys yield `None`.
pub fn get_item<T: DeserializeOwned>(conn: &Connection, key: &str) -> CoreResult<Option<T>> {
    let raw: Option<String> = conn
        .query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| row.get(0))
        .optional()?;

    match raw {
        Some(json) => match serde_json::from_str(&json) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::error!("Error reading {}: {}", key, e);
                Err(e.into())
            }
        },
        None => Ok(None),
    }
}

/// Serialize and store one key, replacing any previous value
pub fn set_item<T: Serialize + ?Sized>(conn: &Connection, key: &str, value: &T) -> CoreResult<()> {
    let json = serde_json::to_string(value)?;
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, json],
    )
    .map_err(|e| {
        log::error!("Error saving {}: {}", key, e);
        e
    })?;
    Ok(())
}

pub fn remove_item(conn: &Connection, key: &str) -> CoreResult<()> {
    conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
    Ok(())
}

/// Remove several keys in one transaction
pub fn remove_items(conn: &mut Connection, keys: &[&str]) -> CoreResult<usize> {
    let tx = conn.transaction()?;
    let mut removed = 0;
    for key in keys {
        removed += tx.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
    }
    tx.commit()?;
    Ok(removed)
}

/// Load a collection, treating a missing key as empty
pub fn get_collection<T: DeserializeOwned>(conn: &Connection, key: &str) -> CoreResult<Vec<T>> {
    Ok(get_item::<Vec<T>>(conn, key)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        id: String,
        count: u32,
    }

    #[test]
    fn set_then_get_replaces_whole_value() {
        let conn = init_in_memory().unwrap();
        set_item(&conn, "entries", &vec![Entry { id: "a".into(), count: 1 }]).unwrap();
        set_item(&conn, "entries", &vec![Entry { id: "b".into(), count: 2 }]).unwrap();

        let entries: Vec<Entry> = get_collection(&conn, "entries").unwrap();
        assert_eq!(entries, vec![Entry { id: "b".into(), count: 2 }]);
    }

    #[test]
    fn missing_key_is_none_and_empty_collection() {
        let conn = init_in_memory().unwrap();
        assert!(get_item::<Entry>(&conn, "nothing").unwrap().is_none());
        assert!(get_collection::<Entry>(&conn, "nothing").unwrap().is_empty());
    }

    #[test]
    fn corrupted_value_is_an_error() {
        let conn = init_in_memory().unwrap();
        conn.execute("INSERT INTO kv_store (key, value) VALUES ('broken', '[{')", []).unwrap();
        assert!(get_collection::<Entry>(&conn, "broken").is_err());
    }

    #[test]
    fn app_version_written_on_init() {
        let conn = init_in_memory().unwrap();
        let version: Option<String> = get_item(&conn, APP_VERSION).unwrap();
        assert_eq!(version.as_deref(), Some(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn remove_items_clears_listed_keys() {
        let mut conn = init_in_memory().unwrap();
        set_item(&conn, WORD_SETS, &Vec::<Entry>::new()).unwrap();
        set_item(&conn, STUDY_STATS, &Vec::<Entry>::new()).unwrap();
        let removed = remove_items(&mut conn, &ALL_KEYS).unwrap();
        assert_eq!(removed, 3);
        assert!(get_item::<Vec<Entry>>(&conn, WORD_SETS).unwrap().is_none());
    }

    #[test]
    fn file_database_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wordmemo.db");
        let path = path.to_str().unwrap();
        {
            let conn = init_database(path).unwrap();
            set_item(&conn, "entries", &vec![Entry { id: "x".into(), count: 7 }]).unwrap();
        }
        let conn = init_database(path).unwrap();
        let entries: Vec<Entry> = get_collection(&conn, "entries").unwrap();
        assert_eq!(entries[0].count, 7);
        remove_item(&conn, "entries").unwrap();
        assert!(get_collection::<Entry>(&conn, "entries").unwrap().is_empty());
    }
}
