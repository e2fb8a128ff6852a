//! Core domain logic for ThoughtPad.
//! This crate is the single source of truth for note, tag and preference
//! invariants; UI hosts reach it through `thoughtpad_ffi`.

pub mod crypto;
pub mod db;
pub mod logging;
pub mod model;
pub mod prefs;
pub mod reminder;
pub mod repo;
pub mod service;

pub use crypto::{
    CryptoError, InMemoryKeyProvider, KeyProvider, KeyringKeyProvider, PasswordCipher,
};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::checklist::{CheckListItem, CheckListItemId};
pub use model::note::{Note, NoteColor, NoteDetails, NoteId, NoteValidationError};
pub use model::prefs::{
    NoteListType, ReminderDisplayStyle, ReminderFrequency, SortOrder, ThemeConfig,
    UserPreferences,
};
pub use model::tag::{Tag, TagColor, TagId};
pub use prefs::{InMemoryPrefsStore, JsonFilePrefsStore, PrefKey, PrefsError, PrefsStore};
pub use reminder::{QueuedReminderScheduler, ReminderRequest, ReminderScheduler};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::tag_repo::{SqliteTagRepository, TagRepository};
pub use repo::{RepoError, RepoResult};
pub use service::editor::{EditorEvent, EditorOutcome, NoteDraft, NoteEditor};
pub use service::note_list::{build_sections, NoteListService, NoteSections};
pub use service::note_service::{NoteService, NoteServiceContext, NoteServiceError};
pub use service::settings_service::SettingsService;
pub use service::tag_service::{TagService, TagServiceError};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
