//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist notes together with their checklist items and tag links.
//! - Own the child-row synchronisation used by note updates.
//!
//! # Invariants
//! - `insert_note_with_details` and `update_note_with_details` run in a
//!   single `IMMEDIATE` transaction; readers never observe a note with a
//!   half-written checklist or tag set.
//! - Updates replace child rows wholesale: old checklist rows and tag links
//!   are deleted, then the given ones are inserted again.
//! - Checklist item IDs supplied by callers are not trusted; fresh IDs are
//!   generated on every write and items are bound to the owning note.
//! - Checklist order is the order of the slice passed in.

use crate::db::safe_db_call;
use crate::model::checklist::{CheckListItem, CheckListItemId};
use crate::model::note::{Note, NoteColor, NoteDetails, NoteId};
use crate::model::tag::{Tag, TagId};
use crate::repo::tag_repo::{TagRow, TAG_COLUMNS};
use crate::repo::{bool_to_int, ensure_tables, int_to_bool, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    body,
    created_at,
    updated_at,
    is_pinned,
    is_archived,
    color,
    is_deleted,
    is_favorite,
    is_checklist,
    reminder_time,
    attachments,
    password
FROM notes";

const REQUIRED_TABLES: &[&str] = &["notes", "checklist_items", "note_tags", "tags"];

/// Repository interface for notes and their child rows.
pub trait NoteRepository {
    /// Inserts a note, its checklist items and tag links atomically.
    fn insert_note_with_details(
        &self,
        note: &Note,
        checklist_items: &[CheckListItem],
        tag_ids: &[TagId],
    ) -> RepoResult<NoteId>;
    /// Updates a note and replaces its checklist items and tag links atomically.
    fn update_note_with_details(
        &self,
        note: &Note,
        checklist_items: &[CheckListItem],
        tag_ids: &[TagId],
    ) -> RepoResult<()>;
    /// Updates only the note row; child rows are left untouched.
    fn update_note(&self, note: &Note) -> RepoResult<()>;
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    fn get_note_details(&self, id: NoteId) -> RepoResult<Option<NoteDetails>>;
    /// Lists every note (trashed and archived included), newest first.
    fn list_note_details(&self) -> RepoResult<Vec<NoteDetails>>;
    /// Hard-deletes a note with its child rows. Returns removed note count.
    fn delete_note_with_details(&self, id: NoteId) -> RepoResult<usize>;
    fn set_checklist_item_checked(&self, item_id: CheckListItemId, checked: bool)
        -> RepoResult<()>;
    /// Hard-deletes every trashed note. Returns removed note count.
    fn purge_deleted_notes(&self) -> RepoResult<usize>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }

    fn begin(&self) -> rusqlite::Result<Transaction<'conn>> {
        Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_note_with_details(
        &self,
        note: &Note,
        checklist_items: &[CheckListItem],
        tag_ids: &[TagId],
    ) -> RepoResult<NoteId> {
        note.validate()?;
        let attachments = encode_attachments(&note.attachments)?;
        let note_id = note.id.to_string();

        safe_db_call("note_insert_with_details", || {
            let tx = self.begin()?;
            tx.execute(
                "INSERT INTO notes (
                    id,
                    title,
                    body,
                    created_at,
                    updated_at,
                    is_pinned,
                    is_archived,
                    color,
                    is_deleted,
                    is_favorite,
                    is_checklist,
                    reminder_time,
                    attachments,
                    password
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
                params![
                    note_id.as_str(),
                    note.title.as_deref(),
                    note.text.as_deref(),
                    note.created_at,
                    note.updated_at,
                    bool_to_int(note.is_pinned),
                    bool_to_int(note.is_archived),
                    note.color.as_str(),
                    bool_to_int(note.is_deleted),
                    bool_to_int(note.is_favorite),
                    bool_to_int(note.is_checklist),
                    note.reminder_time,
                    attachments.as_str(),
                    note.password.as_deref(),
                ],
            )?;
            insert_children(&tx, note_id.as_str(), checklist_items, tag_ids)?;
            tx.commit()
        })?;

        Ok(note.id)
    }

    fn update_note_with_details(
        &self,
        note: &Note,
        checklist_items: &[CheckListItem],
        tag_ids: &[TagId],
    ) -> RepoResult<()> {
        note.validate()?;
        let attachments = encode_attachments(&note.attachments)?;
        let note_id = note.id.to_string();

        let changed = safe_db_call("note_update_with_details", || {
            let tx = self.begin()?;
            let changed = update_note_row(&tx, note, note_id.as_str(), attachments.as_str())?;
            if changed == 0 {
                // Dropping the transaction rolls it back.
                return Ok(0);
            }

            tx.execute(
                "DELETE FROM checklist_items WHERE note_id = ?1;",
                [note_id.as_str()],
            )?;
            tx.execute(
                "DELETE FROM note_tags WHERE note_id = ?1;",
                [note_id.as_str()],
            )?;
            insert_children(&tx, note_id.as_str(), checklist_items, tag_ids)?;
            tx.commit()?;
            Ok(changed)
        })?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "note",
                id: note.id,
            });
        }
        Ok(())
    }

    fn update_note(&self, note: &Note) -> RepoResult<()> {
        note.validate()?;
        let attachments = encode_attachments(&note.attachments)?;
        let note_id = note.id.to_string();

        let changed = safe_db_call("note_update", || {
            update_note_row(self.conn, note, note_id.as_str(), attachments.as_str())
        })?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "note",
                id: note.id,
            });
        }
        Ok(())
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let row = safe_db_call("note_get", || {
            let mut stmt = self
                .conn
                .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
            let mut rows = stmt.query([id.to_string()])?;
            match rows.next()? {
                Some(row) => NoteRow::read(row).map(Some),
                None => Ok(None),
            }
        })?;

        row.map(NoteRow::into_note).transpose()
    }

    fn get_note_details(&self, id: NoteId) -> RepoResult<Option<NoteDetails>> {
        match self.get_note(id)? {
            Some(note) => self.load_details(note).map(Some),
            None => Ok(None),
        }
    }

    fn list_note_details(&self) -> RepoResult<Vec<NoteDetails>> {
        let rows = safe_db_call("note_list", || {
            let mut stmt = self.conn.prepare(&format!(
                "{NOTE_SELECT_SQL} ORDER BY created_at DESC, id ASC;"
            ))?;
            let mut rows = stmt.query([])?;
            let mut collected = Vec::new();
            while let Some(row) = rows.next()? {
                collected.push(NoteRow::read(row)?);
            }
            Ok(collected)
        })?;

        rows.into_iter()
            .map(|row| row.into_note().and_then(|note| self.load_details(note)))
            .collect()
    }

    fn delete_note_with_details(&self, id: NoteId) -> RepoResult<usize> {
        let note_id = id.to_string();
        let removed = safe_db_call("note_delete_with_details", || {
            let tx = self.begin()?;
            tx.execute(
                "DELETE FROM checklist_items WHERE note_id = ?1;",
                [note_id.as_str()],
            )?;
            tx.execute(
                "DELETE FROM note_tags WHERE note_id = ?1;",
                [note_id.as_str()],
            )?;
            let removed = tx.execute("DELETE FROM notes WHERE id = ?1;", [note_id.as_str()])?;
            tx.commit()?;
            Ok(removed)
        })?;
        Ok(removed)
    }

    fn set_checklist_item_checked(
        &self,
        item_id: CheckListItemId,
        checked: bool,
    ) -> RepoResult<()> {
        let changed = safe_db_call("checklist_item_set_checked", || {
            self.conn.execute(
                "UPDATE checklist_items SET is_checked = ?2 WHERE id = ?1;",
                params![item_id.to_string(), bool_to_int(checked)],
            )
        })?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "checklist item",
                id: item_id,
            });
        }
        Ok(())
    }

    fn purge_deleted_notes(&self) -> RepoResult<usize> {
        let removed = safe_db_call("note_purge_deleted", || {
            self.conn
                .execute("DELETE FROM notes WHERE is_deleted = 1;", [])
        })?;
        Ok(removed)
    }
}

impl SqliteNoteRepository<'_> {
    fn load_details(&self, note: Note) -> RepoResult<NoteDetails> {
        let note_id = note.id.to_string();
        let (item_rows, tag_rows) = safe_db_call("note_load_children", || {
            Ok((
                load_checklist_rows(self.conn, note_id.as_str())?,
                load_tag_rows(self.conn, note_id.as_str())?,
            ))
        })?;

        let checklist_items = item_rows
            .into_iter()
            .map(ChecklistRow::into_item)
            .collect::<RepoResult<Vec<_>>>()?;
        let tags = tag_rows
            .into_iter()
            .map(TagRow::into_tag)
            .collect::<RepoResult<Vec<Tag>>>()?;

        Ok(NoteDetails {
            note,
            checklist_items,
            tags,
        })
    }
}

fn update_note_row(
    conn: &Connection,
    note: &Note,
    note_id: &str,
    attachments: &str,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE notes
         SET
            title = ?2,
            body = ?3,
            created_at = ?4,
            updated_at = ?5,
            is_pinned = ?6,
            is_archived = ?7,
            color = ?8,
            is_deleted = ?9,
            is_favorite = ?10,
            is_checklist = ?11,
            reminder_time = ?12,
            attachments = ?13,
            password = ?14
         WHERE id = ?1;",
        params![
            note_id,
            note.title.as_deref(),
            note.text.as_deref(),
            note.created_at,
            note.updated_at,
            bool_to_int(note.is_pinned),
            bool_to_int(note.is_archived),
            note.color.as_str(),
            bool_to_int(note.is_deleted),
            bool_to_int(note.is_favorite),
            bool_to_int(note.is_checklist),
            note.reminder_time,
            attachments,
            note.password.as_deref(),
        ],
    )
}

fn insert_children(
    tx: &Transaction<'_>,
    note_id: &str,
    checklist_items: &[CheckListItem],
    tag_ids: &[TagId],
) -> rusqlite::Result<()> {
    {
        let mut insert_item = tx.prepare(
            "INSERT INTO checklist_items (id, note_id, text, is_checked, position)
             VALUES (?1, ?2, ?3, ?4, ?5);",
        )?;
        for (position, item) in checklist_items.iter().enumerate() {
            insert_item.execute(params![
                Uuid::new_v4().to_string(),
                note_id,
                item.text.as_deref(),
                bool_to_int(item.is_checked),
                position as i64,
            ])?;
        }
    }

    let mut insert_link =
        tx.prepare("INSERT OR IGNORE INTO note_tags (note_id, tag_id) VALUES (?1, ?2);")?;
    for tag_id in tag_ids {
        insert_link.execute(params![note_id, tag_id.to_string()])?;
    }
    Ok(())
}

fn load_checklist_rows(conn: &Connection, note_id: &str) -> rusqlite::Result<Vec<ChecklistRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, note_id, text, is_checked
         FROM checklist_items
         WHERE note_id = ?1
         ORDER BY position ASC, id ASC;",
    )?;
    let mut rows = stmt.query([note_id])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(ChecklistRow {
            id: row.get("id")?,
            note_id: row.get("note_id")?,
            text: row.get("text")?,
            is_checked: row.get("is_checked")?,
        });
    }
    Ok(items)
}

fn load_tag_rows(conn: &Connection, note_id: &str) -> rusqlite::Result<Vec<TagRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TAG_COLUMNS}
         FROM note_tags nt
         INNER JOIN tags t ON t.id = nt.tag_id
         WHERE nt.note_id = ?1
         ORDER BY t.name COLLATE NOCASE ASC, t.id ASC;"
    ))?;
    let mut rows = stmt.query([note_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(TagRow::read(row)?);
    }
    Ok(tags)
}

fn encode_attachments(attachments: &[String]) -> RepoResult<String> {
    serde_json::to_string(attachments)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode attachments: {err}")))
}

/// Raw `notes` row, decoded into a [`Note`] outside the SQL call.
struct NoteRow {
    id: String,
    title: Option<String>,
    body: Option<String>,
    created_at: Option<i64>,
    updated_at: Option<i64>,
    is_pinned: i64,
    is_archived: i64,
    color: String,
    is_deleted: i64,
    is_favorite: i64,
    is_checklist: i64,
    reminder_time: Option<i64>,
    attachments: String,
    password: Option<Vec<u8>>,
}

impl NoteRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            body: row.get("body")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            is_pinned: row.get("is_pinned")?,
            is_archived: row.get("is_archived")?,
            color: row.get("color")?,
            is_deleted: row.get("is_deleted")?,
            is_favorite: row.get("is_favorite")?,
            is_checklist: row.get("is_checklist")?,
            reminder_time: row.get("reminder_time")?,
            attachments: row.get("attachments")?,
            password: row.get("password")?,
        })
    }

    fn into_note(self) -> RepoResult<Note> {
        let color = NoteColor::parse(&self.color).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid note color `{}` in notes.color", self.color))
        })?;
        let attachments: Vec<String> = serde_json::from_str(&self.attachments).map_err(|err| {
            RepoError::InvalidData(format!("invalid attachments in notes.attachments: {err}"))
        })?;

        let note = Note {
            id: parse_uuid(&self.id, "notes.id")?,
            title: self.title,
            text: self.body,
            created_at: self.created_at,
            updated_at: self.updated_at,
            is_pinned: int_to_bool(self.is_pinned, "notes.is_pinned")?,
            is_archived: int_to_bool(self.is_archived, "notes.is_archived")?,
            color,
            is_deleted: int_to_bool(self.is_deleted, "notes.is_deleted")?,
            is_favorite: int_to_bool(self.is_favorite, "notes.is_favorite")?,
            is_checklist: int_to_bool(self.is_checklist, "notes.is_checklist")?,
            reminder_time: self.reminder_time,
            attachments,
            password: self.password,
        };
        note.validate()?;
        Ok(note)
    }
}

struct ChecklistRow {
    id: String,
    note_id: Option<String>,
    text: Option<String>,
    is_checked: i64,
}

impl ChecklistRow {
    fn into_item(self) -> RepoResult<CheckListItem> {
        Ok(CheckListItem {
            id: parse_uuid(&self.id, "checklist_items.id")?,
            note_id: self
                .note_id
                .as_deref()
                .map(|value| parse_uuid(value, "checklist_items.note_id"))
                .transpose()?,
            text: self.text,
            is_checked: int_to_bool(self.is_checked, "checklist_items.is_checked")?,
        })
    }
}
