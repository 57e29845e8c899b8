//! Error types for the mdnotes core library.

use thiserror::Error;

/// All errors that can occur within the mdnotes core library.
#[derive(Debug, Error)]
pub enum NotesError {
    /// A SQLite operation failed while reading from the store.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The stored note blob exists but does not decode as a note array.
    #[error("Stored notes are corrupt: {0}")]
    CorruptState(String),

    /// Writing to the storage substrate failed (quota exceeded, disk error, ...).
    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    /// A stored value is not valid UTF-8 text. `lossy` holds it with invalid
    /// sequences replaced.
    #[error("Value under '{key}' is not valid text")]
    UndecodableValue { key: String, lossy: String },

    /// A preference value was not one of the accepted values.
    #[error("Invalid preference: {0}")]
    InvalidPreference(String),

    /// The opened file is not a usable mdnotes store.
    #[error("Invalid store: {0}")]
    InvalidStore(String),

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Note data could not be serialized to JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias that pins the error type to [`NotesError`].
pub type Result<T> = std::result::Result<T, NotesError>;

impl NotesError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(e) => format!("Failed to read notes: {e}"),
            Self::CorruptState(_) => {
                "Saved notes could not be read; a backup was kept and fresh notes were created"
                    .to_string()
            }
            Self::StorageWrite(e) => format!("Failed to save notes: {e}"),
            Self::UndecodableValue { key, .. } => format!("Stored value '{key}' is unreadable"),
            Self::InvalidPreference(msg) => msg.clone(),
            Self::InvalidStore(_) => "Could not open notes file".to_string(),
            Self::Io(e) => format!("File error: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
        }
    }
}
