//! Synchronous key-value storage substrates.
//!
//! The note store persists everything as string values under string keys, the
//! same shape as browser local storage. [`SqliteStore`] keeps the pairs in a
//! single SQLite file; [`MemoryStore`] keeps them in a map and can enforce a
//! byte quota.

use crate::{NotesError, Result};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;

/// A synchronous string-keyed storage.
///
/// Implementations report substrate write failures as
/// [`NotesError::StorageWrite`].
pub trait KeyValueStore {
    /// Returns the value stored under `key`, or `None` if absent.
    ///
    /// A value that exists but is not valid text is reported as
    /// [`NotesError::UndecodableValue`].
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens the store at `path`, creating the file and table if needed.
    ///
    /// # Errors
    ///
    /// Returns [`NotesError::InvalidStore`] if the file exists but is not a
    /// SQLite database.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(include_str!("schema.sql"))
            .map_err(|e| NotesError::InvalidStore(format!("Not a valid mdnotes store: {e}")))?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get::<_, Value>(0)
            })
            .optional()?;

        // Files edited by other tools may hold non-TEXT values.
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Text(text)) => Ok(Some(text)),
            Some(Value::Integer(n)) => Ok(Some(n.to_string())),
            Some(Value::Real(x)) => Ok(Some(x.to_string())),
            Some(Value::Blob(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => Ok(Some(text)),
                Err(e) => Err(NotesError::UndecodableValue {
                    key: key.to_string(),
                    lossy: String::from_utf8_lossy(e.as_bytes()).into_owned(),
                }),
            },
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                [key, value],
            )
            .map_err(|e| NotesError::StorageWrite(e.to_string()))?;
        Ok(())
    }
}

/// In-memory store, optionally limited to `quota` bytes of keys plus values.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `set` fails once the total size would exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(bytes),
        }
    }

    fn used_bytes_excluding(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            let needed = self.used_bytes_excluding(key) + key.len() + value.len();
            if needed > quota {
                return Err(NotesError::StorageWrite(format!(
                    "quota of {quota} bytes exceeded ({needed} bytes requested)"
                )));
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
