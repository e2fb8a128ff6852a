//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `thoughtpad_core` linkage without the Flutter runtime.
//! - Optionally open a database and print note section counts.
//!
//! Usage: `thoughtpad_cli [DB_PATH] [QUERY]`

use std::process::ExitCode;
use thoughtpad_core::{open_db, InMemoryPrefsStore, NoteListService, SqliteNoteRepository};

fn main() -> ExitCode {
    println!("thoughtpad_core ping={}", thoughtpad_core::ping());
    println!("thoughtpad_core version={}", thoughtpad_core::core_version());

    let mut args = std::env::args().skip(1);
    let Some(db_path) = args.next() else {
        return ExitCode::SUCCESS;
    };
    let query = args.next();

    match print_sections(&db_path, query.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn print_sections(db_path: &str, query: Option<&str>) -> Result<(), String> {
    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let repo = SqliteNoteRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let prefs = InMemoryPrefsStore::new();
    let sections = NoteListService::new(repo, &prefs)
        .sections(query)
        .map_err(|err| err.to_string())?;

    println!("pinned={}", sections.pinned.len());
    println!("others={}", sections.others.len());
    println!("archived={}", sections.archived.len());
    println!("trash={}", sections.trash.len());
    println!("reminders={}", sections.reminders.len());
    Ok(())
}
