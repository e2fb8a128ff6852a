//! Catch-log-rethrow guard around database calls.
//!
//! # Responsibility
//! - Run one database operation and, on failure, emit a single
//!   classified `db_call` error event.
//! - Hand the original error back to the caller untouched.
//!
//! # Invariants
//! - The guard never retries and never swallows errors.
//! - Log lines carry the operation name and failure class only, never SQL
//!   parameters (which may contain note content).

use log::{error, trace};
use rusqlite::ErrorCode;

/// Failure classes reported by [`safe_db_call`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbFailureKind {
    ConstraintViolation,
    DiskFull,
    ReadOnly,
    CannotOpen,
    DiskIo,
    Corrupt,
    PermissionDenied,
    TooBig,
    Busy,
    OutOfMemory,
    NoRows,
    Decode,
    Other,
}

impl DbFailureKind {
    /// Stable `error_code` value used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConstraintViolation => "constraint_violation",
            Self::DiskFull => "disk_full",
            Self::ReadOnly => "read_only",
            Self::CannotOpen => "cannot_open",
            Self::DiskIo => "disk_io",
            Self::Corrupt => "corrupt",
            Self::PermissionDenied => "permission_denied",
            Self::TooBig => "too_big",
            Self::Busy => "busy",
            Self::OutOfMemory => "out_of_memory",
            Self::NoRows => "no_rows",
            Self::Decode => "decode",
            Self::Other => "unexpected",
        }
    }
}

/// Maps a rusqlite error onto a [`DbFailureKind`].
pub fn classify_sqlite_error(err: &rusqlite::Error) -> DbFailureKind {
    match err {
        rusqlite::Error::QueryReturnedNoRows => return DbFailureKind::NoRows,
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::InvalidColumnName(_)
        | rusqlite::Error::IntegralValueOutOfRange(..) => return DbFailureKind::Decode,
        _ => {}
    }

    match err.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => DbFailureKind::ConstraintViolation,
        Some(ErrorCode::DiskFull) => DbFailureKind::DiskFull,
        Some(ErrorCode::ReadOnly) => DbFailureKind::ReadOnly,
        Some(ErrorCode::CannotOpen) => DbFailureKind::CannotOpen,
        Some(ErrorCode::SystemIoFailure) => DbFailureKind::DiskIo,
        Some(ErrorCode::DatabaseCorrupt) | Some(ErrorCode::NotADatabase) => {
            DbFailureKind::Corrupt
        }
        Some(ErrorCode::PermissionDenied) => DbFailureKind::PermissionDenied,
        Some(ErrorCode::TooBig) => DbFailureKind::TooBig,
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => DbFailureKind::Busy,
        Some(ErrorCode::OutOfMemory) => DbFailureKind::OutOfMemory,
        _ => DbFailureKind::Other,
    }
}

/// Runs `call`, logging a classified error event when it fails.
///
/// `operation` should be a short snake_case name such as
/// `note_insert_with_details`.
pub fn safe_db_call<T>(
    operation: &'static str,
    call: impl FnOnce() -> rusqlite::Result<T>,
) -> rusqlite::Result<T> {
    match call() {
        Ok(value) => {
            trace!("event=db_call module=repo status=ok op={operation}");
            Ok(value)
        }
        Err(err) => {
            let kind = classify_sqlite_error(&err);
            error!(
                "event=db_call module=repo status=error op={operation} error_code={} error={err}",
                kind.as_str()
            );
            Err(err)
        }
    }
}
