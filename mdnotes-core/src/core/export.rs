//! Exporting a note as a standalone markdown file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::note::Note;
use crate::Result;

/// File extension given to exported notes.
pub const EXPORT_EXTENSION: &str = "md";

/// A note ready to be written out: the raw markdown and its file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownExport {
    pub filename: String,
    pub content: String,
}

/// Builds the export file name from a note title: lowercased, every run of
/// whitespace collapsed to a single `_`, with the markdown extension.
pub fn export_filename(title: &str) -> String {
    let mut stem = String::with_capacity(title.len());
    let mut in_whitespace = false;
    for c in title.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                stem.push('_');
            }
            in_whitespace = true;
        } else {
            stem.extend(c.to_lowercase());
            in_whitespace = false;
        }
    }
    format!("{stem}.{EXPORT_EXTENSION}")
}

/// Pairs the note's content, unchanged, with its export file name.
pub fn export_note(note: &Note) -> MarkdownExport {
    MarkdownExport {
        filename: export_filename(&note.title),
        content: note.content.clone(),
    }
}

/// Writes the export into `dir` and returns the written path.
///
/// Path separators in the file name are replaced with `_` so the file always
/// lands directly inside `dir`.
///
/// # Errors
///
/// Returns [`crate::NotesError::Io`] if the file cannot be written.
pub fn write_export<P: AsRef<Path>>(note: &Note, dir: P) -> Result<PathBuf> {
    let export = export_note(note);
    let filename = export.filename.replace(['/', '\\'], "_");
    let path = dir.as_ref().join(filename);
    fs::write(&path, &export.content)?;
    log::info!("exported note {} to {}", note.id, path.display());
    Ok(path)
}
