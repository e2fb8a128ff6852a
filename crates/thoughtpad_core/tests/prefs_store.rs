use std::collections::BTreeMap;
use thoughtpad_core::{
    JsonFilePrefsStore, PrefKey, PrefsStore, ReminderFrequency, SettingsService, SortOrder,
    ThemeConfig,
};

fn read_json(path: &std::path::Path) -> BTreeMap<String, String> {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn opening_missing_file_writes_first_launch_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("prefs.json");

    let store = JsonFilePrefsStore::open(&path).unwrap();

    assert!(path.exists());
    let on_disk = read_json(&path);
    assert_eq!(on_disk.get("sort_order").map(String::as_str), Some("DATE"));
    assert_eq!(
        on_disk.get("reminder_frequency").map(String::as_str),
        Some("WEEKLY")
    );
    let prefs = store.load().unwrap();
    assert_eq!(prefs.theme_config, ThemeConfig::Light);
    assert!(!prefs.is_notification_permissions_granted);
}

#[test]
fn corrupt_file_is_replaced_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, "{not json").unwrap();

    let store = JsonFilePrefsStore::open(&path).unwrap();

    assert_eq!(store.load().unwrap().sort_order, SortOrder::Date);
    assert!(read_json(&path).contains_key("sort_order"));
}

#[test]
fn settings_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");

    {
        let store = JsonFilePrefsStore::open(&path).unwrap();
        let settings = SettingsService::new(&store);
        settings.update_theme(ThemeConfig::Dark).unwrap();
        settings.update_notification_permission(true).unwrap();
        settings
            .update_periodic_reminder_frequency(ReminderFrequency::Daily)
            .unwrap();
    }

    let reopened = JsonFilePrefsStore::open(&path).unwrap();
    let prefs = reopened.load().unwrap();
    assert_eq!(prefs.theme_config, ThemeConfig::Dark);
    assert!(prefs.is_notification_permissions_granted);
    assert_eq!(prefs.reminder_frequency, ReminderFrequency::Daily);
    assert!(!dir.path().join("prefs.json.tmp").exists());
}

#[test]
fn existing_values_survive_default_migration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, r#"{"sort_order":"TITLE","theme_config":"SYSTEM"}"#).unwrap();

    let store = JsonFilePrefsStore::open(&path).unwrap();

    let prefs = store.load().unwrap();
    assert_eq!(prefs.sort_order, SortOrder::Title);
    assert_eq!(prefs.theme_config, ThemeConfig::System);
    assert!(read_json(&path).contains_key("note_list_type"));
}

#[test]
fn clear_all_resets_theme_and_permission_only() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFilePrefsStore::open(dir.path().join("prefs.json")).unwrap();
    let settings = SettingsService::new(&store);
    settings.update_theme(ThemeConfig::Dark).unwrap();
    settings.update_notification_permission(true).unwrap();
    settings.update_sort_order(SortOrder::Title).unwrap();

    settings.clear_all().unwrap();

    let snapshot = store.snapshot().unwrap();
    assert!(!snapshot.contains_key(PrefKey::ThemeConfig.as_str()));
    assert!(!snapshot.contains_key(PrefKey::NotificationPermission.as_str()));
    assert_eq!(settings.preferences().unwrap().sort_order, SortOrder::Title);
}
