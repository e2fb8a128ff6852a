//! Settings use-case service.

use crate::model::prefs::{
    NoteListType, ReminderDisplayStyle, ReminderFrequency, SortOrder, ThemeConfig,
    UserPreferences,
};
use crate::prefs::{PrefKey, PrefsResult, PrefsStore};
use log::info;

/// Typed writes over a [`PrefsStore`].
pub struct SettingsService<'a> {
    prefs: &'a dyn PrefsStore,
}

impl<'a> SettingsService<'a> {
    pub fn new(prefs: &'a dyn PrefsStore) -> Self {
        Self { prefs }
    }

    pub fn preferences(&self) -> PrefsResult<UserPreferences> {
        self.prefs.load()
    }

    pub fn update_theme(&self, theme: ThemeConfig) -> PrefsResult<()> {
        self.write(PrefKey::ThemeConfig, theme.as_str())
    }

    pub fn update_notification_permission(&self, granted: bool) -> PrefsResult<()> {
        self.write(PrefKey::NotificationPermission, flag(granted))
    }

    pub fn update_reminder_display_style(&self, style: ReminderDisplayStyle) -> PrefsResult<()> {
        self.write(PrefKey::ReminderDisplayStyle, style.as_str())
    }

    pub fn update_periodic_reminder_status(&self, enabled: bool) -> PrefsResult<()> {
        self.write(PrefKey::ReminderStatus, flag(enabled))
    }

    pub fn update_periodic_reminder_frequency(
        &self,
        frequency: ReminderFrequency,
    ) -> PrefsResult<()> {
        self.write(PrefKey::ReminderFrequency, frequency.as_str())
    }

    pub fn update_sort_order(&self, sort_order: SortOrder) -> PrefsResult<()> {
        self.write(PrefKey::SortOrder, sort_order.as_str())
    }

    pub fn update_note_list_type(&self, list_type: NoteListType) -> PrefsResult<()> {
        self.write(PrefKey::NoteListType, list_type.as_str())
    }

    /// Resets theme and notification permission. Other keys are kept.
    pub fn clear_all(&self) -> PrefsResult<()> {
        self.prefs.remove(PrefKey::ThemeConfig)?;
        self.prefs.remove(PrefKey::NotificationPermission)?;
        info!("event=prefs_clear module=service status=ok");
        Ok(())
    }

    fn write(&self, key: PrefKey, value: &str) -> PrefsResult<()> {
        self.prefs.set(key, value)?;
        info!(
            "event=prefs_update module=service status=ok key={}",
            key.as_str()
        );
        Ok(())
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
