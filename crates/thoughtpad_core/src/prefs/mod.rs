//! Preferences key-value store.
//!
//! # Responsibility
//! - Persist user preferences as string key/value pairs.
//! - Decode the raw map into a typed `UserPreferences` snapshot.
//!
//! # Invariants
//! - Values are enum storage names or `"true"`/`"false"`.
//! - Missing or unrecognised values decode to the model defaults; a bad
//!   value never fails a read.

use crate::model::prefs::{
    NoteListType, ReminderDisplayStyle, ReminderFrequency, SortOrder, ThemeConfig,
    UserPreferences,
};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Mutex;

mod file_store;

pub use file_store::JsonFilePrefsStore;

pub type PrefsResult<T> = Result<T, PrefsError>;

/// Raw key/value view of the store.
pub type PrefsMap = BTreeMap<String, String>;

/// Preference store failure.
#[derive(Debug)]
pub enum PrefsError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Encode(serde_json::Error),
    /// A previous writer panicked while holding the store lock.
    Poisoned,
}

impl Display for PrefsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "preferences I/O failed at `{}`: {source}", path.display())
            }
            Self::Encode(err) => write!(f, "failed to encode preferences: {err}"),
            Self::Poisoned => write!(f, "preferences store lock is poisoned"),
        }
    }
}

impl Error for PrefsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
            Self::Poisoned => None,
        }
    }
}

/// Known preference keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefKey {
    ThemeConfig,
    NotificationPermission,
    ReminderFrequency,
    ReminderDisplayStyle,
    ReminderStatus,
    SortOrder,
    NoteListType,
}

impl PrefKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThemeConfig => "theme_config",
            Self::NotificationPermission => "notification_permission",
            Self::ReminderFrequency => "reminder_frequency",
            Self::ReminderDisplayStyle => "reminder_display_style",
            Self::ReminderStatus => "reminder_status",
            Self::SortOrder => "sort_order",
            Self::NoteListType => "note_list_type",
        }
    }
}

/// Key/value preference storage.
///
/// Implementations must be safe to share between threads; writes are
/// serialised internally.
pub trait PrefsStore: Send + Sync {
    /// Returns a copy of every stored pair.
    fn snapshot(&self) -> PrefsResult<PrefsMap>;
    fn set(&self, key: PrefKey, value: &str) -> PrefsResult<()>;
    fn remove(&self, key: PrefKey) -> PrefsResult<()>;

    /// Loads the typed preference snapshot.
    fn load(&self) -> PrefsResult<UserPreferences> {
        Ok(decode_preferences(&self.snapshot()?))
    }
}

/// Decodes a raw map into typed preferences, defaulting bad values.
pub fn decode_preferences(map: &PrefsMap) -> UserPreferences {
    let get = |key: PrefKey| map.get(key.as_str()).map(String::as_str);
    let flag = |key: PrefKey| get(key) == Some("true");

    UserPreferences {
        theme_config: get(PrefKey::ThemeConfig)
            .and_then(ThemeConfig::parse)
            .unwrap_or_default(),
        is_notification_permissions_granted: flag(PrefKey::NotificationPermission),
        sort_order: get(PrefKey::SortOrder)
            .and_then(SortOrder::parse)
            .unwrap_or_default(),
        reminder_display_style: get(PrefKey::ReminderDisplayStyle)
            .and_then(ReminderDisplayStyle::parse)
            .unwrap_or_default(),
        is_periodic_reminders_enabled: flag(PrefKey::ReminderStatus),
        reminder_frequency: get(PrefKey::ReminderFrequency)
            .and_then(ReminderFrequency::parse)
            .unwrap_or_default(),
        note_list_type: get(PrefKey::NoteListType)
            .and_then(NoteListType::parse)
            .unwrap_or_default(),
    }
}

/// Fills keys introduced after the first release with their defaults.
///
/// Returns whether the map changed.
pub(crate) fn migrate_defaults(map: &mut PrefsMap) -> bool {
    let defaults = [
        (
            PrefKey::ReminderDisplayStyle,
            ReminderDisplayStyle::default().as_str(),
        ),
        (PrefKey::SortOrder, SortOrder::default().as_str()),
        (
            PrefKey::ReminderFrequency,
            ReminderFrequency::default().as_str(),
        ),
        (PrefKey::NoteListType, NoteListType::default().as_str()),
    ];

    let mut changed = false;
    for (key, value) in defaults {
        if !map.contains_key(key.as_str()) {
            map.insert(key.as_str().to_string(), value.to_string());
            changed = true;
        }
    }
    changed
}

/// Process-local store, used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryPrefsStore {
    values: Mutex<PrefsMap>,
}

impl InMemoryPrefsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrefsStore for InMemoryPrefsStore {
    fn snapshot(&self) -> PrefsResult<PrefsMap> {
        let values = self.values.lock().map_err(|_| PrefsError::Poisoned)?;
        Ok(values.clone())
    }

    fn set(&self, key: PrefKey, value: &str) -> PrefsResult<()> {
        let mut values = self.values.lock().map_err(|_| PrefsError::Poisoned)?;
        values.insert(key.as_str().to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: PrefKey) -> PrefsResult<()> {
        let mut values = self.values.lock().map_err(|_| PrefsError::Poisoned)?;
        values.remove(key.as_str());
        Ok(())
    }
}
