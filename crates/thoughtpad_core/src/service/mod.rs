//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, preference, reminder and crypto calls into
//!   use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

use std::time::{SystemTime, UNIX_EPOCH};

pub mod editor;
pub mod note_list;
pub mod note_service;
pub mod settings_service;
pub mod tag_service;

/// Current wall-clock time in epoch milliseconds.
pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
