//! Core library for mdnotes — a local-first markdown note-taking application.
//!
//! The primary entry point is [`NoteStore`], which owns the note collection,
//! the active selection and the search query, and writes every change through a
//! [`Persistence`] adapter to a [`KeyValueStore`] ([`SqliteStore`] on disk,
//! [`MemoryStore`] in memory).
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use crate::core::{
    action::Action,
    error::{NotesError, Result},
    export::{export_filename, export_note, write_export, MarkdownExport, EXPORT_EXTENSION},
    note::{
        derive_title, normalize_title, ContentStats, Note, DEFAULT_NOTE_CONTENT, UNTITLED_TITLE,
        WELCOME_NOTE_ID, WELCOME_NOTE_TITLE,
    },
    persistence::{Persistence, PreferenceKey, CORRUPT_BACKUP_KEY, NOTES_KEY},
    preferences::{is_first_visit, ColorTheme, ThemeSettings},
    render::render_markdown,
    storage::{KeyValueStore, MemoryStore, SqliteStore},
    store::{NoteStore, Outcome},
};
