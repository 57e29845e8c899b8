//! The closed set of note-store operations as data.
//!
//! A front end can build an [`Action`] (or receive one as JSON) and hand it to
//! [`NoteStore::dispatch`](crate::NoteStore::dispatch). Actions are applied
//! immediately and are not logged.

use serde::{Deserialize, Serialize};

/// One note-store operation.
///
/// Serialized with a `type` tag holding the PascalCase variant name, e.g.
/// `{"type":"UpdateTitle","id":"…","title":"…"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    /// Prepend a fresh default note and select it.
    CreateNote,
    /// Replace a note's content; its title is re-derived.
    UpdateContent { id: String, content: String },
    /// Replace a note's title.
    UpdateTitle { id: String, title: String },
    /// Remove a note.
    DeleteNote { id: String },
    /// Select a note.
    SetActive { id: String },
    /// Set the search query.
    SetSearchQuery { query: String },
}
