//! User preference model.
//!
//! # Responsibility
//! - Define typed preference values and their defaults.
//! - Map each value to/from its stable storage name.
//!
//! # Invariants
//! - Unknown or missing storage values resolve to the documented default.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { default $default:ident => $default_str:literal $(, $variant:ident => $value:literal)* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            #[default]
            $default,
            $($variant,)*
        }

        impl $name {
            /// Storage name.
            pub fn as_str(self) -> &'static str {
                match self {
                    Self::$default => $default_str,
                    $(Self::$variant => $value,)*
                }
            }

            /// Parses a storage name. Returns `None` for unknown values.
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $default_str => Some(Self::$default),
                    $($value => Some(Self::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

named_enum! {
    /// App color theme.
    pub enum ThemeConfig { default Light => "LIGHT", Dark => "DARK", System => "SYSTEM" }
}

named_enum! {
    /// Ordering of the note list.
    pub enum SortOrder { default Date => "DATE", Title => "TITLE" }
}

named_enum! {
    /// Layout of the reminders section.
    pub enum ReminderDisplayStyle { default List => "LIST", Grid => "GRID" }
}

named_enum! {
    /// Cadence of periodic app-usage reminders.
    pub enum ReminderFrequency { default Weekly => "WEEKLY", Never => "NEVER", Daily => "DAILY" }
}

named_enum! {
    /// Layout of the main note list.
    pub enum NoteListType { default Grid => "GRID", List => "LIST" }
}

impl ReminderFrequency {
    /// Period between app-usage reminders, `None` when disabled.
    pub fn interval(self) -> Option<Duration> {
        match self {
            Self::Never => None,
            Self::Daily => Some(DAY),
            Self::Weekly => Some(DAY * 7),
        }
    }
}

/// Snapshot of all user preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub theme_config: ThemeConfig,
    pub is_notification_permissions_granted: bool,
    pub sort_order: SortOrder,
    pub reminder_display_style: ReminderDisplayStyle,
    pub is_periodic_reminders_enabled: bool,
    pub reminder_frequency: ReminderFrequency,
    pub note_list_type: NoteListType,
}
