//! Schema migrations for the notes database.
//!
//! # Responsibility
//! - Keep the ordered list of SQL scripts shipped with the binary.
//! - Bring an older database up to [`latest_version`] in one transaction.
//!
//! # Invariants
//! - Script versions start at 1 and increase by exactly one.
//! - `PRAGMA user_version` always equals the last script applied.
//! - Shipped scripts are never edited; schema changes get a new script.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;
use std::time::Instant;

/// One shipped schema script.
#[derive(Debug, Clone, Copy)]
struct Script {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

macro_rules! script {
    ($version:literal, $file:literal) => {
        Script {
            version: $version,
            name: $file,
            sql: include_str!($file),
        }
    };
}

const SCRIPTS: &[Script] = &[
    script!(1, "0001_init.sql"),
    script!(2, "0002_note_password.sql"),
    script!(3, "0003_note_favorite.sql"),
];

/// Highest schema version this binary can produce.
pub fn latest_version() -> u32 {
    SCRIPTS.last().map_or(0, |script| script.version)
}

/// Scripts a database at `version` still needs, oldest first.
fn pending_after(version: u32) -> &'static [Script] {
    let applied = SCRIPTS
        .iter()
        .take_while(|script| script.version <= version)
        .count();
    &SCRIPTS[applied..]
}

/// Upgrades `conn` to the latest schema.
///
/// A failing script rolls back every script of this run.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = read_user_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    let pending = pending_after(from);
    if pending.is_empty() {
        debug!("event=db_migrate module=db status=skipped version={from}");
        return Ok(());
    }

    let started_at = Instant::now();
    let tx = conn.transaction()?;
    for script in pending {
        tx.execute_batch(script.sql)?;
        tx.pragma_update(None, "user_version", script.version)?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} script={}",
            script.version, script.name
        );
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={from} to_version={latest} steps={} duration_ms={}",
        pending.len(),
        started_at.elapsed().as_millis()
    );
    Ok(())
}

fn read_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}
