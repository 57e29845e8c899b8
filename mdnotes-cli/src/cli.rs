use clap::{Args, Parser, Subcommand};
use mdnotes_core::ColorTheme;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mdnotes")]
#[command(version, about = "Markdown notes with live HTML preview, stored locally")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Notes file (defaults to $MDNOTES_DATA, then ~/.config/mdnotes/notes.db)
    #[arg(long, global = true, value_name = "PATH")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List notes; new notes are added at the top
    List {
        /// Only notes whose title or content contains this text (any case)
        #[arg(long, short)]
        search: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a note's markdown (the active note if no ID is given)
    Show {
        /// Note ID or unique ID prefix
        id: Option<String>,
    },

    /// Create a new note
    New,

    /// Replace a note's content; the title follows its first line
    Edit {
        /// Note ID or unique ID prefix
        id: String,

        /// New markdown content (read from stdin when omitted)
        #[arg(long)]
        content: Option<String>,
    },

    /// Rename a note
    Title {
        /// Note ID or unique ID prefix
        id: String,

        /// New title
        title: String,
    },

    /// Delete a note
    Delete {
        /// Note ID or unique ID prefix
        id: String,
    },

    /// Render a note to HTML (the active note if no ID is given)
    Render {
        /// Note ID or unique ID prefix
        id: Option<String>,
    },

    /// Write a note to a .md file (the active note if no ID is given)
    Export {
        /// Note ID or unique ID prefix
        id: Option<String>,

        /// Directory to write into
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Print the getting-started guide
    Guide,

    /// Show or change appearance settings
    Theme(ThemeCommand),
}

#[derive(Args, Debug)]
pub struct ThemeCommand {
    /// Switch to dark mode
    #[arg(long, conflicts_with_all = ["light", "toggle"])]
    pub dark: bool,

    /// Switch to light mode
    #[arg(long, conflicts_with = "toggle")]
    pub light: bool,

    /// Flip between dark and light mode
    #[arg(long)]
    pub toggle: bool,

    /// Accent color: blue, purple, emerald or rose
    #[arg(long)]
    pub color: Option<ColorTheme>,
}
