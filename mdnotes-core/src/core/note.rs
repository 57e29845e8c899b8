use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title used whenever a note would otherwise have an empty one.
pub const UNTITLED_TITLE: &str = "Untitled Note";

/// Reserved id of the onboarding note seeded on first run.
pub const WELCOME_NOTE_ID: &str = "welcome-note";

/// Title of the onboarding note.
pub const WELCOME_NOTE_TITLE: &str = "Welcome to Markdown Notes";

/// Body given to freshly created notes.
pub const DEFAULT_NOTE_CONTENT: &str = "# Untitled Note\n\nStart writing here...";

const WELCOME_NOTE_CONTENT: &str = include_str!("welcome.md");

/// A single titled markdown document.
///
/// Serialized with camelCase keys (`createdAt`, `updatedAt`) so the stored blob
/// stays compatible with notes written by the browser build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// A placeholder note with a fresh UUID.
    pub fn new_default(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: UNTITLED_TITLE.to_string(),
            content: DEFAULT_NOTE_CONTENT.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The fixed onboarding note.
    pub fn welcome(now: DateTime<Utc>) -> Self {
        Self {
            id: WELCOME_NOTE_ID.to_string(),
            title: WELCOME_NOTE_TITLE.to_string(),
            content: WELCOME_NOTE_CONTENT.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_welcome(&self) -> bool {
        self.id == WELCOME_NOTE_ID
    }

    /// Case-insensitive substring match against title or content.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }

    /// Advances `updated_at`, never moving it backwards.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

/// Derives a note title from the first line of its markdown content.
///
/// A leading run of `#` followed by optional whitespace is stripped. Anything
/// after the marker is kept verbatim, trailing whitespace included.
pub fn derive_title(content: &str) -> String {
    let first_line = content.split('\n').next().unwrap_or_default();
    let stripped = match first_line.strip_prefix('#') {
        Some(rest) => rest.trim_start_matches('#').trim_start(),
        None => first_line,
    };
    if stripped.is_empty() {
        UNTITLED_TITLE.to_string()
    } else {
        stripped.to_string()
    }
}

/// Trims a user-entered title, substituting the placeholder when nothing is left.
pub fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        UNTITLED_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Character and word counts shown beneath the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentStats {
    pub characters: usize,
    pub words: usize,
}

impl ContentStats {
    pub fn of(content: &str) -> Self {
        Self {
            characters: content.chars().count(),
            words: content.split_whitespace().count(),
        }
    }
}
