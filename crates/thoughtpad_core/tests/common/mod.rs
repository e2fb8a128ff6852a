#![allow(dead_code)]

use rusqlite::Connection;
use thoughtpad_core::db::open_db_in_memory;
use thoughtpad_core::{
    InMemoryKeyProvider, InMemoryPrefsStore, Note, NoteService, NoteServiceContext,
    PasswordCipher, PrefKey, PrefsStore, QueuedReminderScheduler, SqliteNoteRepository,
    SqliteTagRepository, Tag, TagRepository,
};

/// Migrated in-memory database plus in-memory collaborators.
pub struct Fixture {
    pub conn: Connection,
    pub prefs: InMemoryPrefsStore,
    pub reminders: QueuedReminderScheduler,
    pub cipher: PasswordCipher,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            conn: open_db_in_memory().unwrap(),
            prefs: InMemoryPrefsStore::new(),
            reminders: QueuedReminderScheduler::new(),
            cipher: PasswordCipher::from_provider(&InMemoryKeyProvider::new()).unwrap(),
        }
    }

    pub fn with_notification_permission() -> Self {
        let fixture = Self::new();
        fixture
            .prefs
            .set(PrefKey::NotificationPermission, "true")
            .unwrap();
        fixture
    }

    pub fn service(&self) -> NoteService<'_, SqliteNoteRepository<'_>> {
        NoteService::new(
            SqliteNoteRepository::try_new(&self.conn).unwrap(),
            NoteServiceContext {
                prefs: &self.prefs,
                reminders: &self.reminders,
                cipher: Some(&self.cipher),
            },
        )
    }

    pub fn tag_repo(&self) -> SqliteTagRepository<'_> {
        SqliteTagRepository::try_new(&self.conn).unwrap()
    }

    pub fn tag(&self, name: &str) -> Tag {
        let tag = Tag::new(name);
        self.tag_repo().insert_tag(&tag).unwrap();
        tag
    }

    pub fn count(&self, table: &str) -> i64 {
        self.conn
            .query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
                row.get(0)
            })
            .unwrap()
    }
}

pub fn note(title: &str) -> Note {
    let mut note = Note::new();
    note.title = Some(title.to_string());
    note
}

pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}
