//! Tag repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `insert_tag` replaces an existing tag with the same ID; this is how a
//!   deleted tag is restored for undo.
//! - Deleting a tag removes its note links through FK cascade; notes
//!   themselves are untouched.
//! - Listing is ordered by name, case-insensitive.

use crate::db::safe_db_call;
use crate::model::tag::{Tag, TagColor, TagId};
use crate::repo::{ensure_tables, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, TransactionBehavior};

/// Column list shared with note detail loading; expects the `tags` table
/// to be aliased as `t`.
pub(crate) const TAG_COLUMNS: &str = "t.id AS id, t.name AS name, t.color AS color";

/// Repository interface for tag CRUD.
pub trait TagRepository {
    fn insert_tag(&self, tag: &Tag) -> RepoResult<TagId>;
    /// Inserts or replaces all given tags in one transaction.
    fn insert_tags(&self, tags: &[Tag]) -> RepoResult<()>;
    fn update_tag(&self, tag: &Tag) -> RepoResult<()>;
    /// Deletes a tag. Returns removed tag count (0 or 1).
    fn delete_tag(&self, id: TagId) -> RepoResult<usize>;
    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>>;
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["tags", "note_tags"])?;
        Ok(Self { conn })
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn insert_tag(&self, tag: &Tag) -> RepoResult<TagId> {
        safe_db_call("tag_insert", || upsert_tag(self.conn, tag))?;
        Ok(tag.id)
    }

    fn insert_tags(&self, tags: &[Tag]) -> RepoResult<()> {
        safe_db_call("tag_insert_many", || {
            let tx = rusqlite::Transaction::new_unchecked(
                self.conn,
                TransactionBehavior::Immediate,
            )?;
            for tag in tags {
                upsert_tag(&tx, tag)?;
            }
            tx.commit()
        })?;
        Ok(())
    }

    fn update_tag(&self, tag: &Tag) -> RepoResult<()> {
        let changed = safe_db_call("tag_update", || {
            self.conn.execute(
                "UPDATE tags SET name = ?2, color = ?3 WHERE id = ?1;",
                params![tag.id.to_string(), tag.name.as_deref(), tag.color.as_str()],
            )
        })?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "tag",
                id: tag.id,
            });
        }
        Ok(())
    }

    fn delete_tag(&self, id: TagId) -> RepoResult<usize> {
        let removed = safe_db_call("tag_delete", || {
            self.conn
                .execute("DELETE FROM tags WHERE id = ?1;", [id.to_string()])
        })?;
        Ok(removed)
    }

    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>> {
        let row = safe_db_call("tag_get", || {
            let mut stmt = self
                .conn
                .prepare(&format!("SELECT {TAG_COLUMNS} FROM tags t WHERE t.id = ?1;"))?;
            let mut rows = stmt.query([id.to_string()])?;
            match rows.next()? {
                Some(row) => TagRow::read(row).map(Some),
                None => Ok(None),
            }
        })?;

        row.map(TagRow::into_tag).transpose()
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let rows = safe_db_call("tag_list", || {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {TAG_COLUMNS}
                 FROM tags t
                 ORDER BY t.name COLLATE NOCASE ASC, t.id ASC;"
            ))?;
            let mut rows = stmt.query([])?;
            let mut collected = Vec::new();
            while let Some(row) = rows.next()? {
                collected.push(TagRow::read(row)?);
            }
            Ok(collected)
        })?;

        rows.into_iter().map(TagRow::into_tag).collect()
    }
}

fn upsert_tag(conn: &Connection, tag: &Tag) -> rusqlite::Result<usize> {
    // Must update in place: deleting the old row cascades to its note links.
    conn.execute(
        "INSERT INTO tags (id, name, color) VALUES (?1, ?2, ?3)
         ON CONFLICT (id) DO UPDATE SET name = excluded.name, color = excluded.color;",
        params![tag.id.to_string(), tag.name.as_deref(), tag.color.as_str()],
    )
}

/// Raw `tags` row.
pub(crate) struct TagRow {
    id: String,
    name: Option<String>,
    color: String,
}

impl TagRow {
    pub(crate) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            color: row.get("color")?,
        })
    }

    pub(crate) fn into_tag(self) -> RepoResult<Tag> {
        let color = TagColor::parse(&self.color).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid tag color `{}` in tags.color", self.color))
        })?;
        Ok(Tag {
            id: parse_uuid(&self.id, "tags.id")?,
            name: self.name,
            color,
        })
    }
}
