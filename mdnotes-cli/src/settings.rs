//! Where the notes file lives.
//!
//! Resolution order: the `--data` flag, then `MDNOTES_DATA`, then an
//! OS-appropriate default.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the notes file location.
pub const DATA_ENV_VAR: &str = "MDNOTES_DATA";

/// Environment variable standing in for the system dark-mode signal.
pub const PREFERS_DARK_ENV_VAR: &str = "MDNOTES_PREFERS_DARK";

/// Returns the default path of the notes file.
///
/// - macOS / Linux: `~/.config/mdnotes/notes.db`
/// - Windows: `%APPDATA%/mdnotes/notes.db`
pub fn default_data_file_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("mdnotes").join("notes.db")
    }
    #[cfg(not(target_os = "windows"))]
    {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("mdnotes").join("notes.db")
    }
}

pub fn resolve_data_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| env::var_os(DATA_ENV_VAR).map(PathBuf::from))
        .unwrap_or_else(default_data_file_path)
}

/// Creates the parent directory of `path` if it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Reads the dark-mode signal used when no theme has been saved.
pub fn system_prefers_dark() -> bool {
    matches!(
        env::var(PREFERS_DARK_ENV_VAR).as_deref(),
        Ok("1") | Ok("true") | Ok("dark")
    )
}
