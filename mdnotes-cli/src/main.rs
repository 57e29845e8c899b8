mod cli;
mod handlers;
mod settings;

use clap::Parser;
use cli::{Cli, Commands};
use handlers::Result;
use mdnotes_core::{NoteStore, Persistence, SqliteStore};
use std::io;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("mdnotes: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

fn open_store(path: &Path) -> Result<NoteStore<SqliteStore>> {
    let store = NoteStore::open(Persistence::new(SqliteStore::open(path)?))?;
    if let Some(e) = store.load_error() {
        eprintln!("mdnotes: {}", e.user_message());
    }
    if let Some(msg) = store.last_error() {
        eprintln!("mdnotes: {msg}");
    }
    Ok(store)
}

fn run(cli: Cli) -> Result<()> {
    let path = settings::resolve_data_path(cli.data);
    settings::ensure_parent_dir(&path)?;
    log::debug!("using notes file {}", path.display());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::List { search, json } => {
            handlers::list(&mut open_store(&path)?, search.as_deref(), json, &mut out)
        }
        Commands::Show { id } => handlers::show(&mut open_store(&path)?, id.as_deref(), &mut out),
        Commands::New => handlers::new_note(&mut open_store(&path)?, &mut out),
        Commands::Edit { id, content } => handlers::edit(
            &mut open_store(&path)?,
            &id,
            content,
            &mut io::stdin().lock(),
            &mut out,
        ),
        Commands::Title { id, title } => {
            handlers::title(&mut open_store(&path)?, &id, &title, &mut out)
        }
        Commands::Delete { id } => handlers::delete(&mut open_store(&path)?, &id, &mut out),
        Commands::Render { id } => handlers::render(&mut open_store(&path)?, id.as_deref(), &mut out),
        Commands::Export { id, dir } => {
            handlers::export(&mut open_store(&path)?, id.as_deref(), &dir, &mut out)
        }
        Commands::Guide => handlers::guide(&mut open_store(&path)?, &mut out),
        Commands::Theme(cmd) => {
            // Separate handle on the same file; the note store owns its own.
            let mut preferences = Persistence::new(SqliteStore::open(&path)?);
            handlers::theme(&mut preferences, &cmd, settings::system_prefers_dark(), &mut out)
        }
    }
}
