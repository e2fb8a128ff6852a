//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose note, tag, preference and reminder use-cases to Dart via FRB.
//! - Flatten core types into string-keyed envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Failures are reported as `ok=false` plus a message, never as panics.
//! - Storage paths are fixed after first use.

use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;
use thoughtpad_core::db::open_db;
use thoughtpad_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CheckListItem, JsonFilePrefsStore, KeyProvider, Note, NoteColor, NoteDetails, NoteService,
    NoteServiceContext, NoteServiceError, NoteListService, PasswordCipher,
    QueuedReminderScheduler, ReminderFrequency, SettingsService, SortOrder, SqliteNoteRepository,
    SqliteTagRepository, Tag, TagColor, TagService, ThemeConfig, UserPreferences,
};
use uuid::Uuid;

const DB_FILE_NAME: &str = "thoughtpad.sqlite3";
const PREFS_FILE_NAME: &str = "thoughtpad_prefs.json";

static STORAGE: OnceLock<StoragePaths> = OnceLock::new();
static REMINDERS: OnceLock<QueuedReminderScheduler> = OnceLock::new();
static CIPHER: OnceLock<PasswordCipher> = OnceLock::new();
static PREFS: OnceLock<JsonFilePrefsStore> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoragePaths {
    db_path: PathBuf,
    prefs_path: PathBuf,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Idempotent for the same `level + log_dir`; conflicting calls fail.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the database and preference file locations for this process.
///
/// Without this call, `THOUGHTPAD_DB_PATH` / `THOUGHTPAD_PREFS_PATH` are
/// read, then the temp directory is used.
///
/// # FFI contract
/// - Returns empty string on success.
/// - Fails when paths are blank or storage already resolved elsewhere.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_storage(db_path: String, prefs_path: String) -> String {
    let (db_path, prefs_path) = (db_path.trim(), prefs_path.trim());
    if db_path.is_empty() || prefs_path.is_empty() {
        return "configure_storage failed: paths cannot be empty".to_string();
    }

    let requested = StoragePaths {
        db_path: PathBuf::from(db_path),
        prefs_path: PathBuf::from(prefs_path),
    };
    let active = STORAGE.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "storage already configured at `{}`; refusing to switch to `{}`",
            active.db_path.display(),
            requested.db_path.display()
        )
    }
}

/// Checklist line as exposed to Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistEntry {
    /// Set on output only. `note_save` ignores it: every save replaces the
    /// note's lines and the repository assigns fresh ids.
    pub id: String,
    pub text: String,
    pub is_checked: bool,
}

/// Flat note projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: Option<String>,
    /// `None` while the note is password protected.
    pub text: Option<String>,
    pub color: String,
    pub is_pinned: bool,
    pub is_archived: bool,
    pub is_deleted: bool,
    pub is_favorite: bool,
    pub is_checklist: bool,
    pub is_locked: bool,
    pub reminder_time: Option<i64>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    /// Empty while the note is password protected.
    pub checklist: Vec<ChecklistEntry>,
    pub tags: Vec<TagItem>,
}

/// Save input. `id=None` inserts, otherwise the stored note is updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSaveRequest {
    pub id: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub color: String,
    pub is_pinned: bool,
    pub is_checklist: bool,
    pub reminder_time: Option<i64>,
    pub checklist: Vec<ChecklistEntry>,
    pub tag_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteResponse {
    pub ok: bool,
    pub note: Option<NoteItem>,
    pub message: String,
}

impl NoteResponse {
    fn success(message: impl Into<String>, note: Option<NoteItem>) -> Self {
        Self {
            ok: true,
            note,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteSectionsResponse {
    pub ok: bool,
    pub pinned: Vec<NoteItem>,
    pub others: Vec<NoteItem>,
    pub archived: Vec<NoteItem>,
    pub trash: Vec<NoteItem>,
    pub reminders: Vec<NoteItem>,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    pub id: Option<String>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagItem {
    pub id: String,
    pub name: Option<String>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagsListResponse {
    pub ok: bool,
    pub items: Vec<TagItem>,
    pub message: String,
}

/// Preference snapshot; enum values use their storage names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefsResponse {
    pub ok: bool,
    pub theme: String,
    pub sort_order: String,
    pub notification_permission: bool,
    pub reminder_display_style: String,
    pub periodic_reminders_enabled: bool,
    pub reminder_frequency: String,
    pub note_list_type: String,
    pub message: String,
}

impl PrefsResponse {
    fn from_prefs(prefs: &UserPreferences) -> Self {
        Self {
            ok: true,
            theme: prefs.theme_config.as_str().to_string(),
            sort_order: prefs.sort_order.as_str().to_string(),
            notification_permission: prefs.is_notification_permissions_granted,
            reminder_display_style: prefs.reminder_display_style.as_str().to_string(),
            periodic_reminders_enabled: prefs.is_periodic_reminders_enabled,
            reminder_frequency: prefs.reminder_frequency.as_str().to_string(),
            note_list_type: prefs.note_list_type.as_str().to_string(),
            message: String::new(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ok: false,
            ..Self::from_prefs(&UserPreferences::default())
        }
    }
}

/// Periodic app-usage reminder the host schedules as a repeating alarm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicReminderPlan {
    pub ok: bool,
    /// `false` when disabled in settings or the frequency is `NEVER`.
    pub active: bool,
    pub interval_ms: Option<i64>,
    pub title: String,
    pub body: String,
    pub message: String,
}

impl PeriodicReminderPlan {
    fn inactive(ok: bool, message: impl Into<String>) -> Self {
        Self {
            ok,
            active: false,
            interval_ms: None,
            title: String::new(),
            body: String::new(),
            message: message.into(),
        }
    }
}

/// Reminder the host must hand to the platform alarm surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub note_id: String,
    pub fire_at: i64,
    pub title: String,
    pub body: String,
}

/// Inserts or updates one note with its checklist and tag links.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Update keeps archive/trash/favorite flags and password of the stored note.
#[flutter_rust_bridge::frb(sync)]
pub fn note_save(request: NoteSaveRequest) -> NoteResponse {
    let color = match NoteColor::parse(request.color.trim()) {
        Some(color) => color,
        None => return NoteResponse::failure(format!("unknown note color `{}`", request.color)),
    };
    let tag_ids = match request
        .tag_ids
        .iter()
        .map(|raw| parse_id(raw))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(ids) => ids,
        Err(err) => return NoteResponse::failure(err),
    };
    let items = request
        .checklist
        .iter()
        .map(|entry| CheckListItem {
            is_checked: entry.is_checked,
            ..CheckListItem::new(entry.text.as_str())
        })
        .collect::<Vec<_>>();

    let result = with_note_service(false, |service| {
        let mut note = match request.id.as_deref() {
            Some(raw) => {
                let id = parse_id(raw).map_err(FfiError::Input)?;
                service
                    .get_note_details(id)?
                    .ok_or(NoteServiceError::NoteNotFound(id))?
                    .note
            }
            None => Note::new(),
        };
        note.title = request.title.clone();
        note.text = request.text.clone();
        note.color = color;
        note.is_pinned = request.is_pinned;
        note.is_checklist = request.is_checklist;
        note.reminder_time = request.reminder_time;

        let details = if request.id.is_some() {
            service.update_note_with_details(note, &items, &tag_ids)?
        } else {
            service.insert_note_with_details(note, &items, &tag_ids)?
        };
        Ok(details)
    });

    match result {
        Ok(details) => NoteResponse::success("Note saved.", Some(to_note_item(&details))),
        Err(err) => NoteResponse::failure(format!("note_save failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_get(id: String) -> NoteResponse {
    let result = with_note_service(false, |service| {
        let id = parse_id(&id).map_err(FfiError::Input)?;
        Ok(service.get_note_details(id)?)
    });
    match result {
        Ok(Some(details)) => NoteResponse::success("", Some(to_note_item(&details))),
        Ok(None) => NoteResponse::success("Note not found.", None),
        Err(err) => NoteResponse::failure(format!("note_get failed: {err}")),
    }
}

/// Loads list sections, filtered by an optional search query.
#[flutter_rust_bridge::frb(sync)]
pub fn note_sections(query: Option<String>) -> NoteSectionsResponse {
    let result = (|| -> Result<_, FfiError> {
        let storage = resolve_storage();
        let conn = open_db(&storage.db_path)?;
        let repo = SqliteNoteRepository::try_new(&conn)?;
        let service = NoteListService::new(repo, prefs_store()?);
        Ok(service.sections(query.as_deref())?)
    })();

    match result {
        Ok(sections) => NoteSectionsResponse {
            ok: true,
            pinned: to_note_items(&sections.pinned),
            others: to_note_items(&sections.others),
            archived: to_note_items(&sections.archived),
            trash: to_note_items(&sections.trash),
            reminders: to_note_items(&sections.reminders),
            message: format!("Loaded {} note(s).", sections.total()),
        },
        Err(err) => NoteSectionsResponse {
            message: format!("note_sections failed: {err}"),
            ..NoteSectionsResponse::default()
        },
    }
}

/// Permanently deletes a note.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(id: String) -> ActionResponse {
    note_action("note_delete", "Note deleted.", &id, false, |service, id| {
        service.delete_note(id)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_set_pinned(id: String, pinned: bool) -> ActionResponse {
    note_action("note_set_pinned", "Note updated.", &id, false, |service, id| {
        service.set_pinned(id, pinned).map(drop)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_set_archived(id: String, archived: bool) -> ActionResponse {
    note_action("note_set_archived", "Note updated.", &id, false, |service, id| {
        service.set_archived(id, archived).map(drop)
    })
}

/// Moves a note to trash (`true`) or restores it (`false`).
#[flutter_rust_bridge::frb(sync)]
pub fn note_set_trashed(id: String, trashed: bool) -> ActionResponse {
    note_action("note_set_trashed", "Note updated.", &id, false, |service, id| {
        if trashed {
            service.move_to_trash(id).map(drop)
        } else {
            service.restore_from_trash(id).map(drop)
        }
    })
}

/// Password-protects a note.
///
/// # FFI contract
/// - Reaches the OS keychain on first use to load or create the key.
#[flutter_rust_bridge::frb(sync)]
pub fn note_lock(id: String, password: String) -> ActionResponse {
    note_action("note_lock", "Note locked.", &id, true, |service, id| {
        service.lock_note(id, &password).map(drop)
    })
}

/// Checks a password; `ok=true` only when it opens the note.
#[flutter_rust_bridge::frb(sync)]
pub fn note_unlock(id: String, password: String) -> ActionResponse {
    let result = with_note_service(true, |service| {
        let id = parse_id(&id).map_err(FfiError::Input)?;
        Ok(service.unlock_note(id, &password)?)
    });
    match result {
        Ok(true) => ActionResponse::success("Note unlocked.", None),
        Ok(false) => ActionResponse::failure("Wrong password."),
        Err(err) => ActionResponse::failure(format!("note_unlock failed: {err}")),
    }
}

/// Creates a tag; `color` falls back to the default tag color when unknown.
#[flutter_rust_bridge::frb(sync)]
pub fn tag_create(name: String, color: Option<String>) -> ActionResponse {
    let color = color
        .as_deref()
        .and_then(|raw| TagColor::parse(raw.trim()))
        .unwrap_or_default();
    match with_tag_service(|service| Ok(service.create_tag(&name, color)?)) {
        Ok(tag) => ActionResponse::success("Tag created.", Some(tag.id.to_string())),
        Err(err) => ActionResponse::failure(format!("tag_create failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn tag_delete(id: String) -> ActionResponse {
    let result = with_tag_service(|service| {
        let id = parse_id(&id).map_err(FfiError::Input)?;
        Ok(service.delete_tag(id)?)
    });
    match result {
        Ok(tag) => ActionResponse::success("Tag deleted.", Some(tag.id.to_string())),
        Err(err) => ActionResponse::failure(format!("tag_delete failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn tags_list() -> TagsListResponse {
    match with_tag_service(|service| Ok(service.list_tags()?)) {
        Ok(tags) => TagsListResponse {
            ok: true,
            message: format!("Found {} tag(s).", tags.len()),
            items: tags.iter().map(to_tag_item).collect(),
        },
        Err(err) => TagsListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("tags_list failed: {err}"),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn prefs_get() -> PrefsResponse {
    match with_settings(|settings| Ok(settings.preferences()?)) {
        Ok(prefs) => PrefsResponse::from_prefs(&prefs),
        Err(err) => PrefsResponse::failure(format!("prefs_get failed: {err}")),
    }
}

/// Sets the theme by storage name (`LIGHT|DARK|SYSTEM`).
#[flutter_rust_bridge::frb(sync)]
pub fn prefs_set_theme(theme: String) -> PrefsResponse {
    let Some(theme) = ThemeConfig::parse(theme.trim()) else {
        return PrefsResponse::failure(format!("unknown theme `{theme}`"));
    };
    prefs_update(|settings| settings.update_theme(theme))
}

/// Sets the list order by storage name (`DATE|TITLE`).
#[flutter_rust_bridge::frb(sync)]
pub fn prefs_set_sort_order(sort_order: String) -> PrefsResponse {
    let Some(sort_order) = SortOrder::parse(sort_order.trim()) else {
        return PrefsResponse::failure(format!("unknown sort order `{sort_order}`"));
    };
    prefs_update(|settings| settings.update_sort_order(sort_order))
}

#[flutter_rust_bridge::frb(sync)]
pub fn prefs_set_notification_permission(granted: bool) -> PrefsResponse {
    prefs_update(|settings| settings.update_notification_permission(granted))
}

/// Enables or disables the periodic reminder and sets its frequency
/// (`NEVER|DAILY|WEEKLY`).
#[flutter_rust_bridge::frb(sync)]
pub fn prefs_set_periodic_reminder(enabled: bool, frequency: String) -> PrefsResponse {
    let Some(frequency) = ReminderFrequency::parse(frequency.trim()) else {
        return PrefsResponse::failure(format!("unknown reminder frequency `{frequency}`"));
    };
    prefs_update(|settings| {
        settings.update_periodic_reminder_status(enabled)?;
        settings.update_periodic_reminder_frequency(frequency)
    })
}

/// Returns the repeat interval and a freshly picked nudge message for the
/// periodic reminder.
///
/// # FFI contract
/// - Sync call, preferences-backed execution.
/// - The host reschedules its repeating alarm with the returned values.
#[flutter_rust_bridge::frb(sync)]
pub fn periodic_reminder_plan() -> PeriodicReminderPlan {
    let prefs = match with_settings(|settings| Ok(settings.preferences()?)) {
        Ok(prefs) => prefs,
        Err(err) => {
            let message = format!("periodic_reminder_plan failed: {err}");
            return PeriodicReminderPlan::inactive(false, message);
        }
    };
    if !prefs.is_periodic_reminders_enabled {
        return PeriodicReminderPlan::inactive(true, "Periodic reminders are off.");
    }
    let Some(interval) = prefs.reminder_frequency.interval() else {
        return PeriodicReminderPlan::inactive(true, "Periodic reminders are off.");
    };
    let (title, body) = thoughtpad_core::reminder::periodic_nudge();
    PeriodicReminderPlan {
        ok: true,
        active: true,
        interval_ms: i64::try_from(interval.as_millis()).ok(),
        title: title.to_string(),
        body: body.to_string(),
        message: String::new(),
    }
}

/// Drains reminders scheduled since the last call, earliest first.
#[flutter_rust_bridge::frb(sync)]
pub fn take_scheduled_reminders() -> Vec<ReminderItem> {
    match reminders().take_pending() {
        Ok(pending) => pending
            .into_iter()
            .map(|request| ReminderItem {
                note_id: request.note_id.to_string(),
                fire_at: request.fire_at,
                title: request.notification_title,
                body: request.body,
            })
            .collect(),
        Err(err) => {
            warn!("event=reminder_drain module=ffi status=error error={err}");
            Vec::new()
        }
    }
}

/// Boundary error: anything that can fail while serving one FFI call.
#[derive(Debug)]
enum FfiError {
    Input(String),
    Core(String),
}

impl std::fmt::Display for FfiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input(message) | Self::Core(message) => f.write_str(message),
        }
    }
}

macro_rules! core_error {
    ($($source:ty),+ $(,)?) => {
        $(impl From<$source> for FfiError {
            fn from(value: $source) -> Self {
                Self::Core(value.to_string())
            }
        })+
    };
}

core_error!(
    thoughtpad_core::DbError,
    thoughtpad_core::RepoError,
    thoughtpad_core::PrefsError,
    thoughtpad_core::CryptoError,
    thoughtpad_core::NoteServiceError,
    thoughtpad_core::TagServiceError,
);

fn resolve_storage() -> &'static StoragePaths {
    STORAGE.get_or_init(|| StoragePaths {
        db_path: env_path("THOUGHTPAD_DB_PATH")
            .unwrap_or_else(|| std::env::temp_dir().join(DB_FILE_NAME)),
        prefs_path: env_path("THOUGHTPAD_PREFS_PATH")
            .unwrap_or_else(|| std::env::temp_dir().join(PREFS_FILE_NAME)),
    })
}

fn env_path(name: &str) -> Option<PathBuf> {
    let raw = std::env::var(name).ok()?;
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

/// Single store per process so preference writes are serialised.
fn prefs_store() -> Result<&'static JsonFilePrefsStore, FfiError> {
    if let Some(store) = PREFS.get() {
        return Ok(store);
    }
    let store = JsonFilePrefsStore::open(&resolve_storage().prefs_path)?;
    Ok(PREFS.get_or_init(|| store))
}

fn reminders() -> &'static QueuedReminderScheduler {
    REMINDERS.get_or_init(QueuedReminderScheduler::new)
}

fn cipher() -> Result<&'static PasswordCipher, FfiError> {
    if let Some(cipher) = CIPHER.get() {
        return Ok(cipher);
    }
    let cipher = PasswordCipher::from_provider(&key_provider())?;
    Ok(CIPHER.get_or_init(|| cipher))
}

#[cfg(not(test))]
fn key_provider() -> impl KeyProvider {
    thoughtpad_core::KeyringKeyProvider::new()
}

#[cfg(test)]
fn key_provider() -> impl KeyProvider {
    thoughtpad_core::InMemoryKeyProvider::new()
}

fn parse_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid id `{raw}`"))
}

fn with_note_service<T>(
    needs_cipher: bool,
    f: impl FnOnce(&NoteService<'_, SqliteNoteRepository<'_>>) -> Result<T, FfiError>,
) -> Result<T, FfiError> {
    let storage = resolve_storage();
    let conn = open_db(&storage.db_path)?;
    let prefs = prefs_store()?;
    let cipher = if needs_cipher { Some(cipher()?) } else { None };
    let repo = SqliteNoteRepository::try_new(&conn)?;
    let service = NoteService::new(
        repo,
        NoteServiceContext {
            prefs,
            reminders: reminders(),
            cipher,
        },
    );
    f(&service)
}

fn note_action(
    op: &str,
    success: &str,
    id: &str,
    needs_cipher: bool,
    f: impl FnOnce(&NoteService<'_, SqliteNoteRepository<'_>>, Uuid) -> Result<(), NoteServiceError>,
) -> ActionResponse {
    let result = with_note_service(needs_cipher, |service| {
        let id = parse_id(id).map_err(FfiError::Input)?;
        f(service, id)?;
        Ok(id)
    });
    match result {
        Ok(id) => ActionResponse::success(success, Some(id.to_string())),
        Err(err) => ActionResponse::failure(format!("{op} failed: {err}")),
    }
}

fn with_tag_service<T>(
    f: impl FnOnce(&TagService<SqliteTagRepository<'_>>) -> Result<T, FfiError>,
) -> Result<T, FfiError> {
    let conn = open_db(&resolve_storage().db_path)?;
    let repo = SqliteTagRepository::try_new(&conn)?;
    f(&TagService::new(repo))
}

fn with_settings<T>(
    f: impl FnOnce(&SettingsService<'_>) -> Result<T, FfiError>,
) -> Result<T, FfiError> {
    f(&SettingsService::new(prefs_store()?))
}

fn prefs_update(
    apply: impl FnOnce(&SettingsService<'_>) -> thoughtpad_core::prefs::PrefsResult<()>,
) -> PrefsResponse {
    let result = with_settings(|settings| {
        apply(settings)?;
        Ok(settings.preferences()?)
    });
    match result {
        Ok(prefs) => PrefsResponse::from_prefs(&prefs),
        Err(err) => PrefsResponse::failure(format!("prefs update failed: {err}")),
    }
}

fn to_note_items(notes: &[NoteDetails]) -> Vec<NoteItem> {
    notes.iter().map(to_note_item).collect()
}

fn to_note_item(details: &NoteDetails) -> NoteItem {
    let note = &details.note;
    let locked = note.is_locked();
    NoteItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        text: if locked { None } else { note.text.clone() },
        color: note.color.as_str().to_string(),
        is_pinned: note.is_pinned,
        is_archived: note.is_archived,
        is_deleted: note.is_deleted,
        is_favorite: note.is_favorite,
        is_checklist: note.is_checklist,
        is_locked: locked,
        reminder_time: note.reminder_time,
        created_at: note.created_at,
        updated_at: note.updated_at,
        checklist: if locked {
            Vec::new()
        } else {
            details
                .checklist_items
                .iter()
                .map(|item| ChecklistEntry {
                    id: item.id.to_string(),
                    text: item.text.clone().unwrap_or_default(),
                    is_checked: item.is_checked,
                })
                .collect()
        },
        tags: details.tags.iter().map(to_tag_item).collect(),
    }
}

fn to_tag_item(tag: &Tag) -> TagItem {
    TagItem {
        id: tag.id.to_string(),
        name: tag.name.clone(),
        color: tag.color.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        configure_storage, core_version, init_logging, note_delete, note_get, note_lock,
        note_save, note_sections, note_set_trashed, note_unlock, periodic_reminder_plan, ping,
        prefs_get, prefs_set_notification_permission, prefs_set_periodic_reminder,
        prefs_set_sort_order, prefs_set_theme,
        resolve_storage, tag_create, tag_delete, tags_list, take_scheduled_reminders,
        ChecklistEntry, NoteSaveRequest,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }

    fn save_request(title: &str) -> NoteSaveRequest {
        NoteSaveRequest {
            id: None,
            title: Some(title.to_string()),
            text: Some("body".to_string()),
            color: "Blue".to_string(),
            is_pinned: false,
            is_checklist: true,
            reminder_time: None,
            checklist: vec![ChecklistEntry {
                id: String::new(),
                text: "first".to_string(),
                is_checked: true,
            }],
            tag_ids: Vec::new(),
        }
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn configure_storage_accepts_active_paths_and_rejects_others() {
        let active = resolve_storage();
        let same = configure_storage(
            active.db_path.display().to_string(),
            active.prefs_path.display().to_string(),
        );
        assert_eq!(same, "");

        let other = configure_storage("/tmp/other.sqlite3".to_string(), "/tmp/o.json".to_string());
        assert!(other.contains("refusing to switch"));
        assert!(!configure_storage(" ".to_string(), "x".to_string()).is_empty());
    }

    #[test]
    fn note_save_then_get_round_trips_fields() {
        let title = unique_token("ffi-note");
        let saved = note_save(save_request(&title));
        assert!(saved.ok, "{}", saved.message);
        let item = saved.note.expect("saved note");
        assert_eq!(item.color, "Blue");
        assert_eq!(item.checklist.len(), 1);
        assert!(item.checklist[0].is_checked);

        let loaded = note_get(item.id.clone());
        assert!(loaded.ok, "{}", loaded.message);
        assert_eq!(loaded.note.expect("note").title.as_deref(), Some(title.as_str()));

        let mut update = save_request("renamed");
        update.id = Some(item.id.clone());
        update.checklist.clear();
        let updated = note_save(update);
        assert!(updated.ok, "{}", updated.message);
        assert!(updated.note.expect("note").checklist.is_empty());

        assert!(note_delete(item.id.clone()).ok);
        assert!(note_get(item.id).note.is_none());
    }

    #[test]
    fn note_save_rejects_unknown_color() {
        let mut request = save_request("bad color");
        request.color = "Magenta".to_string();
        let response = note_save(request);
        assert!(!response.ok);
        assert!(response.message.contains("Magenta"));
    }

    #[test]
    fn trashed_note_moves_to_trash_section() {
        let title = unique_token("ffi-trash");
        let id = note_save(save_request(&title)).note.expect("note").id;

        assert!(note_set_trashed(id.clone(), true).ok);
        let sections = note_sections(Some(title.clone()));
        assert!(sections.ok, "{}", sections.message);
        assert!(sections.trash.iter().any(|note| note.id == id));
        assert!(sections.others.iter().all(|note| note.id != id));

        assert!(note_set_trashed(id.clone(), false).ok);
        let sections = note_sections(Some(title));
        assert!(sections.others.iter().any(|note| note.id == id));
    }

    #[test]
    fn locked_note_hides_text_and_checks_password() {
        let id = note_save(save_request(&unique_token("ffi-lock")))
            .note
            .expect("note")
            .id;

        let locked = note_lock(id.clone(), "s3cret".to_string());
        assert!(locked.ok, "{}", locked.message);

        let item = note_get(id.clone()).note.expect("note");
        assert!(item.is_locked);
        assert_eq!(item.text, None);
        assert!(item.checklist.is_empty());

        assert!(note_unlock(id.clone(), "s3cret".to_string()).ok);
        assert!(!note_unlock(id, "guess".to_string()).ok);
    }

    #[test]
    fn tags_create_list_and_delete() {
        let name = unique_token("ffi tag");
        let created = tag_create(name.clone(), Some("Green".to_string()));
        assert!(created.ok, "{}", created.message);
        let id = created.id.expect("tag id");

        let listed = tags_list();
        let tag = listed
            .items
            .iter()
            .find(|tag| tag.id == id)
            .expect("created tag listed");
        assert_eq!(tag.color, "Green");
        assert!(tag.name.as_deref().unwrap_or_default().starts_with("Ffi tag"));

        assert!(tag_delete(id.clone()).ok);
        assert!(!tag_delete(id).ok);
        assert!(!tag_create("   ".to_string(), None).ok);
    }

    #[test]
    fn prefs_updates_are_reflected_and_validated() {
        assert!(prefs_set_theme("DARK".to_string()).ok);
        assert!(!prefs_set_theme("NEON".to_string()).ok);
        assert!(!prefs_set_sort_order("SIZE".to_string()).ok);

        let prefs = prefs_get();
        assert!(prefs.ok, "{}", prefs.message);
        assert_eq!(prefs.theme, "DARK");
    }

    #[test]
    fn future_reminder_is_queued_when_permitted() {
        assert!(prefs_set_notification_permission(true).notification_permission);
        let fire_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_millis() as i64
            + 3_600_000;
        let mut request = save_request(&unique_token("ffi-reminder"));
        request.reminder_time = Some(fire_at);
        let id = note_save(request).note.expect("note").id;

        let drained = take_scheduled_reminders();
        let reminder = drained
            .iter()
            .find(|item| item.note_id == id)
            .expect("reminder queued");
        assert_eq!(reminder.fire_at, fire_at);
        assert!(!reminder.title.is_empty());
    }

    #[test]
    fn note_save_assigns_fresh_checklist_ids() {
        let supplied = "0f5d2c8e-3b1a-4c6f-9e7d-2a4b6c8d0e1f".to_string();
        let mut request = save_request(&unique_token("ffi-checklist"));
        request.checklist[0].id = supplied.clone();

        let item = note_save(request).note.expect("note");
        assert_eq!(item.checklist.len(), 1);
        assert_ne!(item.checklist[0].id, supplied);
        assert!(!item.checklist[0].id.is_empty());

        let mut update = save_request("again");
        update.id = Some(item.id.clone());
        update.checklist[0].id = item.checklist[0].id.clone();
        let updated = note_save(update).note.expect("note");
        assert_ne!(updated.checklist[0].id, item.checklist[0].id);
        assert!(note_delete(item.id).ok);
    }

    #[test]
    fn periodic_reminder_plan_follows_settings() {
        let prefs = prefs_set_periodic_reminder(true, "DAILY".to_string());
        assert!(prefs.ok, "{}", prefs.message);
        assert!(prefs.periodic_reminders_enabled);
        assert_eq!(prefs.reminder_frequency, "DAILY");

        let plan = periodic_reminder_plan();
        assert!(plan.ok && plan.active, "{}", plan.message);
        assert_eq!(plan.interval_ms, Some(86_400_000));
        assert!(!plan.title.is_empty() && !plan.body.is_empty());

        assert!(prefs_set_periodic_reminder(true, "NEVER".to_string()).ok);
        let plan = periodic_reminder_plan();
        assert!(plan.ok && !plan.active);
        assert_eq!(plan.interval_ms, None);

        assert!(!prefs_set_periodic_reminder(true, "HOURLY".to_string()).ok);
        assert!(prefs_set_periodic_reminder(false, "WEEKLY".to_string()).ok);
        assert!(!periodic_reminder_plan().active);
    }
}
