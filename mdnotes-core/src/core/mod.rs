//! Internal domain modules for the mdnotes core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod action;
pub mod error;
pub mod export;
pub mod note;
pub mod persistence;
pub mod preferences;
pub mod render;
pub mod storage;
pub mod store;

#[doc(inline)]
pub use action::Action;
#[doc(inline)]
pub use error::{NotesError, Result};
#[doc(inline)]
pub use export::{export_filename, export_note, write_export, MarkdownExport, EXPORT_EXTENSION};
#[doc(inline)]
pub use note::{
    derive_title, normalize_title, ContentStats, Note, DEFAULT_NOTE_CONTENT, UNTITLED_TITLE,
    WELCOME_NOTE_ID, WELCOME_NOTE_TITLE,
};
#[doc(inline)]
pub use persistence::{Persistence, PreferenceKey, CORRUPT_BACKUP_KEY, NOTES_KEY};
#[doc(inline)]
pub use preferences::{is_first_visit, ColorTheme, ThemeSettings};
#[doc(inline)]
pub use render::render_markdown;
#[doc(inline)]
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
#[doc(inline)]
pub use store::{NoteStore, Outcome};
