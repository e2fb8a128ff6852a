//! Domain model for notes, tags, checklists and preferences.
//!
//! # Responsibility
//! - Define plain records shared by repositories, services and FFI.
//! - Keep storage names for enums next to their definitions.
//!
//! # Invariants
//! - Every note, tag and checklist item is identified by a stable UUID.

pub mod checklist;
pub mod note;
pub mod prefs;
pub mod tag;
