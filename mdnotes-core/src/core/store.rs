//! The note store: sole owner of the note collection, the active selection and
//! the search query.
//!
//! Every mutation is applied in memory first and then written back to the
//! [`Persistence`] adapter as a full replacement of the stored collection. If
//! that write fails the in-memory state is kept and stays authoritative for the
//! session; the failure is returned to the caller and remembered in
//! [`NoteStore::last_error`] until a later save succeeds.

use crate::{
    derive_title, is_first_visit, normalize_title, Action, KeyValueStore, Note, NotesError,
    Persistence, PreferenceKey, Result,
};
use chrono::Utc;
use uuid::Uuid;

/// What a dispatched [`Action`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A note was created and made active.
    Created { note_id: String },
    /// The collection, selection or query changed.
    Changed,
    /// The action named a note that does not exist; nothing happened.
    Unchanged,
}

/// In-memory authority over the notes, backed by a persistence adapter.
///
/// After [`open`](Self::open) returns the collection is never empty. Read
/// access goes through the derived queries; the collection itself is only
/// handed out as a shared slice.
pub struct NoteStore<S: KeyValueStore> {
    persistence: Persistence<S>,
    notes: Vec<Note>,
    active_note_id: Option<String>,
    search_query: String,
    load_error: Option<NotesError>,
    last_error: Option<String>,
}

impl<S: KeyValueStore> NoteStore<S> {
    /// Loads the saved notes, seeding welcome content on first run.
    ///
    /// - Saved notes are adopted as-is and the first one becomes active.
    /// - With nothing saved, the welcome note and one default note are created,
    ///   the welcome note is made active, both are saved immediately and the
    ///   first-visit flag is written.
    /// - A saved but empty collection gets one default note.
    /// - A saved blob that cannot be decoded is set aside under
    ///   [`CORRUPT_BACKUP_KEY`](crate::CORRUPT_BACKUP_KEY), welcome content is
    ///   seeded as on first run, and the decode error is kept in
    ///   [`load_error`](Self::load_error).
    ///
    /// Write failures while seeding do not fail the open; they are logged and
    /// kept in [`last_error`](Self::last_error).
    ///
    /// # Errors
    ///
    /// Returns an error only if reading from the underlying store fails.
    pub fn open(persistence: Persistence<S>) -> Result<Self> {
        let mut store = Self {
            persistence,
            notes: Vec::new(),
            active_note_id: None,
            search_query: String::new(),
            load_error: None,
            last_error: None,
        };

        match store.persistence.load_notes() {
            Ok(Some(notes)) if !notes.is_empty() => {
                log::debug!("loaded {} notes", notes.len());
                store.active_note_id = Some(notes[0].id.clone());
                store.notes = notes;
            }
            Ok(Some(_)) => {
                log::info!("saved note collection is empty, creating a default note");
                let note = store.fresh_note();
                store.active_note_id = Some(note.id.clone());
                store.notes.push(note);
                if let Err(e) = store.persist() {
                    log::debug!("opening without saving the default note: {e}");
                }
            }
            Ok(None) => {
                log::info!("no saved notes found, seeding welcome content");
                store.seed_first_run()?;
            }
            Err(NotesError::CorruptState(reason)) => {
                log::warn!("saved notes could not be decoded ({reason}), seeding welcome content");
                if let Some(raw) = store.persistence.load_raw_notes()? {
                    if let Err(e) = store.persistence.backup_corrupt_notes(&raw) {
                        log::warn!("failed to back up corrupt notes: {e}");
                    }
                }
                store.load_error = Some(NotesError::CorruptState(reason));
                store.seed_first_run()?;
            }
            Err(e) => return Err(e),
        }

        Ok(store)
    }

    fn seed_first_run(&mut self) -> Result<()> {
        let now = Utc::now();
        let welcome = Note::welcome(now);
        self.active_note_id = Some(welcome.id.clone());
        self.notes = vec![welcome, self.fresh_note()];
        if let Err(e) = self.persist() {
            log::debug!("opening without saving welcome content: {e}");
        }

        if is_first_visit(&self.persistence)? {
            if let Err(e) = self.persistence.save_preference(PreferenceKey::FirstVisit, "true") {
                log::warn!("failed to record first visit: {e}");
            }
        }
        Ok(())
    }

    /// A default note whose id is not already in the collection.
    fn fresh_note(&self) -> Note {
        let mut note = Note::new_default(Utc::now());
        while self.contains(&note.id) {
            note.id = Uuid::new_v4().to_string();
        }
        note
    }

    fn contains(&self, id: &str) -> bool {
        self.notes.iter().any(|n| n.id == id)
    }

    fn persist(&mut self) -> Result<()> {
        match self.persistence.save_notes(&self.notes) {
            Ok(()) => {
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                log::warn!("failed to save notes: {e}");
                self.last_error = Some(e.user_message());
                Err(e)
            }
        }
    }

    // ── Mutations ────────────────────────────────────────────────────────────

    /// Prepends a new default note, makes it active and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`NotesError::StorageWrite`] if saving fails; the note is
    /// created regardless.
    pub fn create_note(&mut self) -> Result<String> {
        let note = self.fresh_note();
        let id = note.id.clone();
        self.notes.insert(0, note);
        self.active_note_id = Some(id.clone());
        self.persist()?;
        Ok(id)
    }

    /// Replaces a note's content and re-derives its title from the first line.
    ///
    /// Returns `Ok(false)` without saving if `id` does not exist.
    pub fn update_content(&mut self, id: &str, content: &str) -> Result<bool> {
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            return Ok(false);
        };
        note.content = content.to_string();
        note.title = derive_title(content);
        note.touch(Utc::now());
        self.persist()?;
        Ok(true)
    }

    /// Replaces a note's title, leaving its content alone.
    ///
    /// The title is trimmed; a blank title becomes the placeholder. Returns
    /// `Ok(false)` without saving if `id` does not exist.
    pub fn update_title(&mut self, id: &str, title: &str) -> Result<bool> {
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            return Ok(false);
        };
        note.title = normalize_title(title);
        note.touch(Utc::now());
        self.persist()?;
        Ok(true)
    }

    /// Removes a note.
    ///
    /// Deleting the last note replaces it with a fresh default note, which
    /// becomes active. Deleting the active note activates the new first note.
    /// Returns `Ok(false)` without saving if `id` does not exist.
    pub fn delete_note(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.notes.iter().position(|n| n.id == id) else {
            return Ok(false);
        };
        self.notes.remove(index);

        if self.notes.is_empty() {
            let note = self.fresh_note();
            self.active_note_id = Some(note.id.clone());
            self.notes.push(note);
        } else if self.active_note_id.as_deref() == Some(id) {
            self.active_note_id = Some(self.notes[0].id.clone());
        }

        self.persist()?;
        Ok(true)
    }

    /// Selects a note. The id is not validated; see [`active_note`](Self::active_note).
    pub fn set_active(&mut self, id: &str) {
        self.active_note_id = Some(id.to_string());
    }

    /// Selects the onboarding note, or the first note once it has been
    /// deleted, and returns it.
    pub fn select_guide(&mut self) -> Option<&Note> {
        let id = self
            .notes
            .iter()
            .find(|n| n.is_welcome())
            .or_else(|| self.notes.first())
            .map(|n| n.id.clone())?;
        self.active_note_id = Some(id);
        self.active_note()
    }

    /// Stores the search query verbatim. Not persisted.
    pub fn set_search_query(&mut self, query: &str) {
        self.search_query = query.to_string();
    }

    /// Applies `action` by calling the matching method.
    pub fn dispatch(&mut self, action: Action) -> Result<Outcome> {
        let changed = match action {
            Action::CreateNote => {
                let note_id = self.create_note()?;
                return Ok(Outcome::Created { note_id });
            }
            Action::UpdateContent { id, content } => self.update_content(&id, &content)?,
            Action::UpdateTitle { id, title } => self.update_title(&id, &title)?,
            Action::DeleteNote { id } => self.delete_note(&id)?,
            Action::SetActive { id } => {
                self.set_active(&id);
                true
            }
            Action::SetSearchQuery { query } => {
                self.set_search_query(&query);
                true
            }
        };
        Ok(if changed { Outcome::Changed } else { Outcome::Unchanged })
    }

    // ── Derived reads ────────────────────────────────────────────────────────

    /// All notes in collection order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get_note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// The selected id as stored, which may not name an existing note.
    pub fn active_note_id(&self) -> Option<&str> {
        self.active_note_id.as_deref()
    }

    /// The selected note, falling back to the first note when the selection
    /// is unset or dangling.
    pub fn active_note(&self) -> Option<&Note> {
        self.active_note_id
            .as_deref()
            .and_then(|id| self.get_note(id))
            .or_else(|| self.notes.first())
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Notes whose title or content contains the search query, ignoring case,
    /// in collection order. An empty query matches every note.
    pub fn filtered_notes(&self) -> Vec<&Note> {
        if self.search_query.is_empty() {
            return self.notes.iter().collect();
        }
        let needle = self.search_query.to_lowercase();
        self.notes.iter().filter(|n| n.matches_lowercase(&needle)).collect()
    }

    /// The decode error recovered from during [`open`](Self::open), if any.
    pub fn load_error(&self) -> Option<&NotesError> {
        self.load_error.as_ref()
    }

    /// User-facing message for the most recent failed save, cleared by the
    /// next successful one.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        MemoryStore, SqliteStore, CORRUPT_BACKUP_KEY, NOTES_KEY, UNTITLED_TITLE, WELCOME_NOTE_ID,
    };
    use std::collections::HashSet;
    use tempfile::NamedTempFile;

    fn note(id: &str, title: &str, content: &str) -> Note {
        let mut note = Note::new_default(Utc::now());
        note.id = id.to_string();
        note.title = title.to_string();
        note.content = content.to_string();
        note
    }

    /// Opens a store over a memory substrate pre-loaded with `notes`.
    fn store_with(notes: &[Note]) -> NoteStore<MemoryStore> {
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence.save_notes(notes).unwrap();
        NoteStore::open(persistence).unwrap()
    }

    fn abc() -> NoteStore<MemoryStore> {
        store_with(&[note("a", "A", "alpha"), note("b", "B", "beta"), note("c", "C", "gamma")])
    }

    fn ids<S: KeyValueStore>(store: &NoteStore<S>) -> Vec<String> {
        store.notes().iter().map(|n| n.id.clone()).collect()
    }

    fn assert_unique_ids<S: KeyValueStore>(store: &NoteStore<S>) {
        let unique: HashSet<&str> = store.notes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(unique.len(), store.notes().len(), "duplicate note ids");
    }

    #[test]
    fn test_first_run_seeds_welcome_and_default() {
        let store = NoteStore::open(Persistence::new(MemoryStore::new())).unwrap();

        assert_eq!(store.notes().len(), 2);
        assert_eq!(store.notes()[0].id, WELCOME_NOTE_ID);
        assert_eq!(store.notes()[1].title, UNTITLED_TITLE);
        assert_eq!(store.active_note().unwrap().id, WELCOME_NOTE_ID);
        assert_eq!(store.active_note_id(), Some(WELCOME_NOTE_ID));

        let saved = store.persistence().load_notes().unwrap().unwrap();
        assert_eq!(saved, store.notes());
        assert!(!is_first_visit(store.persistence()).unwrap());
    }

    #[test]
    fn test_open_adopts_saved_notes() {
        let store = abc();
        assert_eq!(ids(&store), vec!["a", "b", "c"]);
        assert_eq!(store.active_note().unwrap().id, "a");
        assert!(store.load_error().is_none());
    }

    #[test]
    fn test_reopen_from_sqlite_file() {
        let temp = NamedTempFile::new().unwrap();
        let created_id = {
            let persistence = Persistence::new(SqliteStore::open(temp.path()).unwrap());
            let mut store = NoteStore::open(persistence).unwrap();
            let id = store.create_note().unwrap();
            store.update_content(&id, "# Persisted\nbody").unwrap();
            id
        };

        let persistence = Persistence::new(SqliteStore::open(temp.path()).unwrap());
        let store = NoteStore::open(persistence).unwrap();
        assert_eq!(store.notes().len(), 3);
        assert_eq!(store.notes()[0].id, created_id);
        assert_eq!(store.notes()[0].title, "Persisted");
        // The selection is not persisted: the first note is active again.
        assert_eq!(store.active_note().unwrap().id, created_id);
    }

    #[test]
    fn test_open_empty_collection_creates_default_note() {
        let store = store_with(&[]);
        assert_eq!(store.notes().len(), 1);
        assert_eq!(store.active_note().unwrap().title, UNTITLED_TITLE);
        assert_eq!(store.persistence().load_notes().unwrap().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_state_is_backed_up_and_reseeded() {
        let mut kv = MemoryStore::new();
        kv.set(NOTES_KEY, "[{broken").unwrap();
        let store = NoteStore::open(Persistence::new(kv)).unwrap();

        assert!(matches!(store.load_error(), Some(NotesError::CorruptState(_))));
        assert_eq!(store.notes()[0].id, WELCOME_NOTE_ID);
        assert_eq!(store.notes().len(), 2);
        assert_eq!(
            store.persistence().store().get(CORRUPT_BACKUP_KEY).unwrap().as_deref(),
            Some("[{broken")
        );
        // The fresh collection replaced the broken blob.
        assert!(store.persistence().load_notes().unwrap().is_some());
    }

    #[test]
    fn test_binary_notes_value_is_backed_up_and_reseeded() {
        let temp = NamedTempFile::new().unwrap();
        {
            let kv = SqliteStore::open(temp.path()).unwrap();
            kv.connection()
                .execute("INSERT INTO kv_store (key, value) VALUES (?1, X'FFFE5B7B')", [NOTES_KEY])
                .unwrap();
        }

        let store = NoteStore::open(Persistence::new(SqliteStore::open(temp.path()).unwrap()))
            .unwrap();

        assert!(matches!(store.load_error(), Some(NotesError::CorruptState(_))));
        assert_eq!(store.notes()[0].id, WELCOME_NOTE_ID);
        assert_eq!(
            store.persistence().store().get(CORRUPT_BACKUP_KEY).unwrap().as_deref(),
            Some("\u{FFFD}\u{FFFD}[{")
        );
        assert_eq!(store.persistence().load_notes().unwrap().unwrap(), store.notes());
    }

    #[test]
    fn test_create_note_prepends_and_activates() {
        let mut store = abc();
        let id = store.create_note().unwrap();

        assert_eq!(store.notes().len(), 4);
        assert_eq!(store.notes()[0].id, id);
        assert_eq!(store.active_note().unwrap().id, id);
        assert_eq!(store.notes()[0].created_at, store.notes()[0].updated_at);
        assert_unique_ids(&store);
        assert_eq!(store.persistence().load_notes().unwrap().unwrap(), store.notes());
    }

    #[test]
    fn test_update_content_derives_title() {
        let mut store = abc();
        let before = store.get_note("b").unwrap().clone();

        assert!(store.update_content("b", "## Shopping list\n- milk").unwrap());

        let after = store.get_note("b").unwrap();
        assert_eq!(after.title, "Shopping list");
        assert_eq!(after.content, "## Shopping list\n- milk");
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(store.get_note("a").unwrap().content, "alpha");
        assert_eq!(store.persistence().load_notes().unwrap().unwrap(), store.notes());
    }

    #[test]
    fn test_update_content_empty_uses_placeholder() {
        let mut store = abc();
        store.update_content("a", "").unwrap();
        assert_eq!(store.get_note("a").unwrap().title, UNTITLED_TITLE);
    }

    #[test]
    fn test_update_title_leaves_content() {
        let mut store = abc();
        assert!(store.update_title("c", "  Renamed  ").unwrap());
        let c = store.get_note("c").unwrap();
        assert_eq!(c.title, "Renamed");
        assert_eq!(c.content, "gamma");

        store.update_title("c", "   ").unwrap();
        assert_eq!(store.get_note("c").unwrap().title, UNTITLED_TITLE);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut store = abc();
        let before = store.notes().to_vec();

        assert!(!store.update_content("zzz", "# x").unwrap());
        assert!(!store.update_title("zzz", "x").unwrap());
        assert!(!store.delete_note("zzz").unwrap());
        assert_eq!(store.notes(), before.as_slice());
        assert_eq!(store.active_note_id(), Some("a"));
    }

    #[test]
    fn test_delete_active_first_selects_next() {
        let mut store = abc();
        store.delete_note("a").unwrap();
        assert_eq!(ids(&store), vec!["b", "c"]);
        assert_eq!(store.active_note().unwrap().id, "b");
        assert_eq!(store.active_note_id(), Some("b"));
    }

    #[test]
    fn test_delete_active_middle_selects_first() {
        let mut store = abc();
        store.set_active("b");
        store.delete_note("b").unwrap();
        assert_eq!(store.active_note().unwrap().id, "a");
    }

    #[test]
    fn test_delete_inactive_keeps_selection() {
        let mut store = abc();
        store.set_active("c");
        store.delete_note("a").unwrap();
        assert_eq!(store.active_note().unwrap().id, "c");
    }

    #[test]
    fn test_delete_last_note_creates_default() {
        let mut store = store_with(&[note("only", "Only", "solo")]);
        store.delete_note("only").unwrap();

        assert_eq!(store.notes().len(), 1);
        let fresh = store.active_note().unwrap();
        assert_ne!(fresh.id, "only");
        assert_eq!(fresh.title, UNTITLED_TITLE);
        assert_eq!(store.active_note_id(), Some(fresh.id.as_str()));
    }

    #[test]
    fn test_collection_never_empty_under_repeated_deletes() {
        let mut store = abc();
        for _ in 0..10 {
            let id = store.notes()[0].id.clone();
            store.delete_note(&id).unwrap();
            assert!(!store.notes().is_empty());
            assert_unique_ids(&store);
        }
        assert_eq!(store.notes().len(), 1);
    }

    #[test]
    fn test_dangling_active_falls_back_to_first() {
        let mut store = abc();
        store.set_active("ghost");
        assert_eq!(store.active_note_id(), Some("ghost"));
        assert_eq!(store.active_note().unwrap().id, "a");
    }

    #[test]
    fn test_filtered_notes() {
        let mut store = store_with(&[
            note("1", "Groceries", "milk and EGGS"),
            note("2", "Work", "quarterly report"),
            note("3", "Eggs benedict", "recipe"),
        ]);

        assert_eq!(store.filtered_notes().len(), 3);

        store.set_search_query("eggs");
        let hits: Vec<&str> = store.filtered_notes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(hits, vec!["1", "3"]);

        store.set_search_query("REPORT");
        let hits: Vec<&str> = store.filtered_notes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(hits, vec!["2"]);

        store.set_search_query("nothing matches");
        assert!(store.filtered_notes().is_empty());
    }

    #[test]
    fn test_search_query_stored_verbatim() {
        let mut store = abc();
        store.set_search_query("  Alpha ");
        assert_eq!(store.search_query(), "  Alpha ");
        // Surrounding spaces are part of the needle.
        assert!(store.filtered_notes().is_empty());
        // Searching never writes.
        assert_eq!(store.persistence().load_notes().unwrap().unwrap(), store.notes());
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let mut kv = MemoryStore::with_quota(4096);
        kv.set(NOTES_KEY, "[]").unwrap();
        let mut store = NoteStore::open(Persistence::new(kv)).unwrap();
        assert!(store.last_error().is_none());

        let huge = "x".repeat(8192);
        let id = store.notes()[0].id.clone();
        let err = store.update_content(&id, &huge).unwrap_err();

        assert!(matches!(err, NotesError::StorageWrite(_)));
        assert_eq!(store.get_note(&id).unwrap().content, huge);
        assert!(store.last_error().is_some());

        // A later save that fits clears the error.
        store.update_content(&id, "# Small").unwrap();
        assert!(store.last_error().is_none());
        assert_eq!(store.persistence().load_notes().unwrap().unwrap()[0].title, "Small");
    }

    /// A store whose substrate has room for exactly the `abc` collection, so
    /// any save that grows it fails.
    fn abc_at_quota() -> NoteStore<MemoryStore> {
        let notes = [note("a", "A", "alpha"), note("b", "B", "beta"), note("c", "C", "gamma")];
        let json = serde_json::to_string(&notes).unwrap();
        let mut kv = MemoryStore::with_quota(NOTES_KEY.len() + json.len());
        kv.set(NOTES_KEY, &json).unwrap();
        NoteStore::open(Persistence::new(kv)).unwrap()
    }

    #[test]
    fn test_create_write_failure_keeps_new_note_active() {
        let mut store = abc_at_quota();

        let err = store.create_note().unwrap_err();
        assert!(matches!(err, NotesError::StorageWrite(_)));
        assert_eq!(store.notes().len(), 4);
        let created = store.notes()[0].id.clone();
        assert_eq!(store.active_note_id(), Some(created.as_str()));
        assert!(store.last_error().is_some());

        let saved: Vec<String> =
            store.persistence().load_notes().unwrap().unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(saved, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_delete_write_failure_keeps_reselection() {
        let mut store = abc_at_quota();
        // The failed create leaves a larger default note in memory, so removing
        // the small note "a" still outgrows the quota.
        assert!(store.create_note().is_err());
        let created = store.notes()[0].id.clone();
        store.set_active("a");

        let err = store.delete_note("a").unwrap_err();
        assert!(matches!(err, NotesError::StorageWrite(_)));
        assert_eq!(ids(&store), vec![created.clone(), "b".to_string(), "c".to_string()]);
        assert_eq!(store.active_note_id(), Some(created.as_str()));
        assert!(store.last_error().is_some());
    }

    #[test]
    fn test_select_guide_prefers_welcome_note() {
        let mut store = NoteStore::open(Persistence::new(MemoryStore::new())).unwrap();
        let id = store.create_note().unwrap();
        assert_eq!(store.active_note_id(), Some(id.as_str()));

        assert_eq!(store.select_guide().unwrap().id, WELCOME_NOTE_ID);
        assert_eq!(store.active_note_id(), Some(WELCOME_NOTE_ID));

        store.delete_note(WELCOME_NOTE_ID).unwrap();
        store.set_active("ghost");
        assert_eq!(store.select_guide().unwrap().id, id);
        assert_eq!(store.active_note_id(), Some(id.as_str()));
    }

    #[test]
    fn test_dispatch_maps_actions() {
        let mut store = abc();

        let note_id = match store.dispatch(Action::CreateNote).unwrap() {
            Outcome::Created { note_id } => note_id,
            other => panic!("expected Created, got {other:?}"),
        };
        assert_eq!(store.active_note().unwrap().id, note_id);

        let outcome = store
            .dispatch(Action::UpdateContent { id: "b".into(), content: "# Bee".into() })
            .unwrap();
        assert_eq!(outcome, Outcome::Changed);
        assert_eq!(store.get_note("b").unwrap().title, "Bee");

        let outcome = store.dispatch(Action::DeleteNote { id: "missing".into() }).unwrap();
        assert_eq!(outcome, Outcome::Unchanged);

        store.dispatch(Action::SetActive { id: "c".into() }).unwrap();
        assert_eq!(store.active_note().unwrap().id, "c");

        store.dispatch(Action::SetSearchQuery { query: "gam".into() }).unwrap();
        assert_eq!(store.filtered_notes().len(), 1);
    }
}
