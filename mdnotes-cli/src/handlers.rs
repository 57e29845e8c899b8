//! Subcommand handlers.
//!
//! Each handler drives the note store through [`Action`]s and writes its
//! report to `out`, so the same code runs against a file-backed store in the
//! binary and an in-memory one in tests.

use crate::cli::ThemeCommand;
use mdnotes_core::{
    render_markdown, write_export, Action, ColorTheme, ContentStats, KeyValueStore, Note,
    NoteStore, NotesError, Outcome, Persistence, ThemeSettings,
};
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Notes(#[from] NotesError),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Note ID prefix '{0}' matches more than one note")]
    AmbiguousId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Notes(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Resolves a full note id or a prefix matching exactly one note.
pub fn resolve_id<S: KeyValueStore>(store: &NoteStore<S>, query: &str) -> Result<String> {
    if store.get_note(query).is_some() {
        return Ok(query.to_string());
    }
    let mut matches = store.notes().iter().filter(|n| n.id.starts_with(query));
    match (matches.next(), matches.next()) {
        (Some(note), None) => Ok(note.id.clone()),
        (Some(_), Some(_)) => Err(CliError::AmbiguousId(query.to_string())),
        (None, _) => Err(CliError::NoteNotFound(query.to_string())),
    }
}

/// Selects `id` if given, then returns the active note.
fn select<'a, S: KeyValueStore>(store: &'a mut NoteStore<S>, id: Option<&str>) -> Result<&'a Note> {
    if let Some(query) = id {
        let id = resolve_id(store, query)?;
        store.dispatch(Action::SetActive { id })?;
    }
    store
        .active_note()
        .ok_or_else(|| CliError::NoteNotFound("no active note".to_string()))
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub fn list<S: KeyValueStore, W: Write>(
    store: &mut NoteStore<S>,
    search: Option<&str>,
    json: bool,
    out: &mut W,
) -> Result<()> {
    store.dispatch(Action::SetSearchQuery {
        query: search.unwrap_or_default().to_string(),
    })?;
    let notes = store.filtered_notes();

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&notes)?)?;
        return Ok(());
    }

    if notes.is_empty() {
        let message = if store.search_query().is_empty() {
            "No notes yet"
        } else {
            "No matching notes found"
        };
        writeln!(out, "{message}")?;
        return Ok(());
    }

    let active_id = store.active_note().map(|n| n.id.as_str());
    for note in &notes {
        let marker = if Some(note.id.as_str()) == active_id { '*' } else { ' ' };
        writeln!(
            out,
            "{marker} {:<8}  {}  {}",
            short_id(&note.id),
            note.updated_at.format("%Y-%m-%d %H:%M"),
            note.title
        )?;
    }
    let noun = if notes.len() == 1 { "note" } else { "notes" };
    writeln!(out, "{} {noun}", notes.len())?;
    Ok(())
}

pub fn show<S: KeyValueStore, W: Write>(
    store: &mut NoteStore<S>,
    id: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let note = select(store, id)?;
    let stats = ContentStats::of(&note.content);
    writeln!(out, "{}  ({})", note.title, note.id)?;
    writeln!(out, "Last updated: {}", note.updated_at.format("%Y-%m-%d %H:%M UTC"))?;
    writeln!(out, "{} characters • {} words", stats.characters, stats.words)?;
    writeln!(out)?;
    writeln!(out, "{}", note.content)?;
    Ok(())
}

pub fn new_note<S: KeyValueStore, W: Write>(store: &mut NoteStore<S>, out: &mut W) -> Result<()> {
    if let Outcome::Created { note_id } = store.dispatch(Action::CreateNote)? {
        writeln!(out, "{note_id}")?;
    }
    Ok(())
}

pub fn edit<S: KeyValueStore, R: Read, W: Write>(
    store: &mut NoteStore<S>,
    id: &str,
    content: Option<String>,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let id = resolve_id(store, id)?;
    let content = match content {
        Some(content) => content,
        None => {
            let mut buf = String::new();
            input.read_to_string(&mut buf)?;
            buf
        }
    };
    store.dispatch(Action::UpdateContent { id: id.clone(), content })?;
    if let Some(note) = store.get_note(&id) {
        writeln!(out, "Updated {}: {}", short_id(&note.id), note.title)?;
    }
    Ok(())
}

pub fn title<S: KeyValueStore, W: Write>(
    store: &mut NoteStore<S>,
    id: &str,
    title: &str,
    out: &mut W,
) -> Result<()> {
    let id = resolve_id(store, id)?;
    store.dispatch(Action::UpdateTitle { id: id.clone(), title: title.to_string() })?;
    if let Some(note) = store.get_note(&id) {
        writeln!(out, "Renamed {} to {}", short_id(&note.id), note.title)?;
    }
    Ok(())
}

pub fn delete<S: KeyValueStore, W: Write>(
    store: &mut NoteStore<S>,
    id: &str,
    out: &mut W,
) -> Result<()> {
    let id = resolve_id(store, id)?;
    store.dispatch(Action::DeleteNote { id: id.clone() })?;
    writeln!(out, "Deleted {}", short_id(&id))?;
    if let Some(active) = store.active_note() {
        writeln!(out, "Active note: {} ({})", active.title, short_id(&active.id))?;
    }
    Ok(())
}

pub fn render<S: KeyValueStore, W: Write>(
    store: &mut NoteStore<S>,
    id: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let note = select(store, id)?;
    write!(out, "{}", render_markdown(&note.content))?;
    Ok(())
}

pub fn export<S: KeyValueStore, W: Write>(
    store: &mut NoteStore<S>,
    id: Option<&str>,
    dir: &Path,
    out: &mut W,
) -> Result<()> {
    let note = select(store, id)?;
    let path = write_export(note, dir)?;
    writeln!(out, "{}", path.display())?;
    Ok(())
}

/// Prints the welcome note, or the first note if it has been deleted.
pub fn guide<S: KeyValueStore, W: Write>(store: &mut NoteStore<S>, out: &mut W) -> Result<()> {
    let note = store
        .select_guide()
        .ok_or_else(|| CliError::NoteNotFound("no notes".to_string()))?;
    writeln!(out, "{}", note.content)?;
    Ok(())
}

pub fn theme<S: KeyValueStore, W: Write>(
    persistence: &mut Persistence<S>,
    cmd: &ThemeCommand,
    system_prefers_dark: bool,
    out: &mut W,
) -> Result<()> {
    let mut settings = ThemeSettings::load(persistence, system_prefers_dark)?;

    if cmd.toggle {
        settings.toggle_dark_mode(persistence)?;
    } else if cmd.dark || cmd.light {
        settings.set_dark_mode(persistence, cmd.dark)?;
    }
    if let Some(color) = cmd.color {
        settings.set_color_theme(persistence, color)?;
    }

    let mode = if settings.dark_mode { "dark" } else { "light" };
    writeln!(out, "Mode: {mode}")?;
    writeln!(out, "Color themes:")?;
    for theme in ColorTheme::ALL {
        let marker = if theme == settings.color_theme { '*' } else { ' ' };
        writeln!(out, "{marker} {:<8} {}", theme.id(), theme.display_name())?;
    }
    Ok(())
}
