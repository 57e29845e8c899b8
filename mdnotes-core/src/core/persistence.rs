//! The persistence adapter: notes and preference scalars over a [`KeyValueStore`].
//!
//! The whole note collection is stored as one JSON array under
//! [`NOTES_KEY`] and is always replaced in full. Preferences live under their
//! own keys and are never touched by note writes.

use crate::{KeyValueStore, Note, NotesError, Result};

/// Key holding the JSON array of notes.
pub const NOTES_KEY: &str = "markdown-notes";

/// Key holding an undecodable notes blob set aside during recovery.
pub const CORRUPT_BACKUP_KEY: &str = "markdown-notes-corrupt-backup";

/// Scalar preference slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceKey {
    /// `"dark"` or `"light"`.
    Theme,
    /// One of the [`ColorTheme`](crate::ColorTheme) ids.
    ColorTheme,
    /// Presence-only sentinel written once on first run.
    FirstVisit,
}

impl PreferenceKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Theme => "markdown-notes-theme",
            Self::ColorTheme => "markdown-notes-color-theme",
            Self::FirstVisit => "markdown-notes-first-visit",
        }
    }
}

pub struct Persistence<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads the saved note collection.
    ///
    /// Returns `Ok(None)` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`NotesError::CorruptState`] if a blob is stored but is not
    /// valid text or not a valid note array, or a substrate error if the read
    /// itself fails.
    pub fn load_notes(&self) -> Result<Option<Vec<Note>>> {
        let raw = match self.store.get(NOTES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(e @ NotesError::UndecodableValue { .. }) => {
                return Err(NotesError::CorruptState(e.to_string()));
            }
            Err(e) => return Err(e),
        };
        let notes = serde_json::from_str::<Vec<Note>>(&raw)
            .map_err(|e| NotesError::CorruptState(e.to_string()))?;
        Ok(Some(notes))
    }

    /// Returns the stored notes blob without decoding it.
    ///
    /// A value that is not valid text comes back lossily converted.
    pub fn load_raw_notes(&self) -> Result<Option<String>> {
        match self.store.get(NOTES_KEY) {
            Err(NotesError::UndecodableValue { lossy, .. }) => Ok(Some(lossy)),
            other => other,
        }
    }

    /// Replaces the stored collection with `notes`.
    ///
    /// # Errors
    ///
    /// Returns [`NotesError::StorageWrite`] if the substrate rejects the write.
    pub fn save_notes(&mut self, notes: &[Note]) -> Result<()> {
        let json = serde_json::to_string(notes)?;
        self.store.set(NOTES_KEY, &json)?;
        log::debug!("saved {} notes ({} bytes)", notes.len(), json.len());
        Ok(())
    }

    /// Sets `raw` aside under [`CORRUPT_BACKUP_KEY`] so it is not lost when
    /// fresh notes overwrite [`NOTES_KEY`].
    pub fn backup_corrupt_notes(&mut self, raw: &str) -> Result<()> {
        self.store.set(CORRUPT_BACKUP_KEY, raw)
    }

    pub fn load_preference(&self, key: PreferenceKey) -> Result<Option<String>> {
        self.store.get(key.as_str())
    }

    pub fn save_preference(&mut self, key: PreferenceKey, value: &str) -> Result<()> {
        self.store.set(key.as_str(), value)
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, SqliteStore};
    use chrono::Utc;
    use tempfile::NamedTempFile;

    fn sample_notes() -> Vec<Note> {
        let now = Utc::now();
        let mut second = Note::new_default(now);
        second.title = "Shopping".to_string();
        second.content = "# Shopping\n\n- milk\n- \"quoted\" eggs".to_string();
        vec![Note::welcome(now), second, Note::new_default(now)]
    }

    #[test]
    fn test_load_notes_absent_is_none() {
        let persistence = Persistence::new(MemoryStore::new());
        assert!(persistence.load_notes().unwrap().is_none());
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let mut persistence = Persistence::new(MemoryStore::new());
        let notes = sample_notes();
        persistence.save_notes(&notes).unwrap();

        let loaded = persistence.load_notes().unwrap().unwrap();
        assert_eq!(loaded, notes);
    }

    #[test]
    fn test_round_trip_through_sqlite_file() {
        let temp = NamedTempFile::new().unwrap();
        let notes = sample_notes();
        {
            let mut persistence = Persistence::new(SqliteStore::open(temp.path()).unwrap());
            persistence.save_notes(&notes).unwrap();
        }

        let persistence = Persistence::new(SqliteStore::open(temp.path()).unwrap());
        assert_eq!(persistence.load_notes().unwrap().unwrap(), notes);
    }

    #[test]
    fn test_save_replaces_whole_collection() {
        let mut persistence = Persistence::new(MemoryStore::new());
        let notes = sample_notes();
        persistence.save_notes(&notes).unwrap();
        persistence.save_notes(&notes[..1]).unwrap();

        assert_eq!(persistence.load_notes().unwrap().unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_blob_is_corrupt_state() {
        let mut store = MemoryStore::new();
        store.set(NOTES_KEY, "{not json").unwrap();
        let persistence = Persistence::new(store);

        assert!(matches!(persistence.load_notes(), Err(NotesError::CorruptState(_))));
        assert_eq!(persistence.load_raw_notes().unwrap().as_deref(), Some("{not json"));
    }

    #[test]
    fn test_wrong_shape_is_corrupt_state() {
        let mut store = MemoryStore::new();
        store.set(NOTES_KEY, r#"[{"id":"a"}]"#).unwrap();
        let persistence = Persistence::new(store);

        assert!(matches!(persistence.load_notes(), Err(NotesError::CorruptState(_))));
    }

    #[test]
    fn test_binary_blob_is_corrupt_state() {
        let temp = NamedTempFile::new().unwrap();
        let store = SqliteStore::open(temp.path()).unwrap();
        store
            .connection()
            .execute("INSERT INTO kv_store (key, value) VALUES (?1, X'FF5B5D')", [NOTES_KEY])
            .unwrap();
        let persistence = Persistence::new(store);

        assert!(matches!(persistence.load_notes(), Err(NotesError::CorruptState(_))));
        assert_eq!(persistence.load_raw_notes().unwrap().as_deref(), Some("\u{FFFD}[]"));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut persistence = Persistence::new(MemoryStore::with_quota(16));
        let err = persistence.save_notes(&sample_notes()).unwrap_err();
        assert!(matches!(err, NotesError::StorageWrite(_)));
    }

    #[test]
    fn test_preferences_use_separate_keys() {
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence.save_preference(PreferenceKey::Theme, "dark").unwrap();
        persistence.save_notes(&sample_notes()).unwrap();

        assert_eq!(
            persistence.load_preference(PreferenceKey::Theme).unwrap().as_deref(),
            Some("dark")
        );
        assert_eq!(persistence.load_preference(PreferenceKey::ColorTheme).unwrap(), None);
        assert_eq!(
            persistence.store().get("markdown-notes-theme").unwrap().as_deref(),
            Some("dark")
        );
    }
}
