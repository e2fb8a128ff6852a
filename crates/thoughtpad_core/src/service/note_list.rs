//! Note list sections, search and ordering.
//!
//! # Invariants
//! - `pinned` and `others` hold notes that are neither trashed nor
//!   archived; pinned notes never appear in `others`.
//! - `archived` excludes trashed notes.
//! - `reminders` holds non-trashed notes with a reminder, earliest first.
//! - The search query filters every section.

use crate::model::note::NoteDetails;
use crate::model::prefs::SortOrder;
use crate::prefs::PrefsStore;
use crate::repo::note_repo::NoteRepository;
use crate::service::note_service::NoteServiceResult;
use serde::Serialize;
use std::cmp::Ordering;

/// Notes grouped the way the list screen and drawer show them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoteSections {
    pub pinned: Vec<NoteDetails>,
    pub others: Vec<NoteDetails>,
    pub archived: Vec<NoteDetails>,
    pub trash: Vec<NoteDetails>,
    pub reminders: Vec<NoteDetails>,
}

impl NoteSections {
    /// Number of distinct notes across the main, archive and trash sections.
    pub fn total(&self) -> usize {
        self.pinned.len() + self.others.len() + self.archived.len() + self.trash.len()
    }
}

/// Groups, filters and orders notes.
///
/// `query` is matched case-insensitively; `None` or blank keeps all notes.
pub fn build_sections(
    notes: Vec<NoteDetails>,
    query: Option<&str>,
    sort_order: SortOrder,
) -> NoteSections {
    let query = query.map(str::trim).filter(|value| !value.is_empty());
    let mut sections = NoteSections::default();

    for details in notes {
        if let Some(query) = query {
            if !details.matches_query(query) {
                continue;
            }
        }

        let note = &details.note;
        if !note.is_deleted && note.reminder_time.is_some() {
            sections.reminders.push(details.clone());
        }

        if note.is_deleted {
            sections.trash.push(details);
        } else if note.is_archived {
            sections.archived.push(details);
        } else if note.is_pinned {
            sections.pinned.push(details);
        } else {
            sections.others.push(details);
        }
    }

    for section in [
        &mut sections.pinned,
        &mut sections.others,
        &mut sections.archived,
        &mut sections.trash,
    ] {
        section.sort_by(|left, right| compare(left, right, sort_order));
    }
    sections
        .reminders
        .sort_by_key(|details| details.note.reminder_time);

    sections
}

fn compare(left: &NoteDetails, right: &NoteDetails, sort_order: SortOrder) -> Ordering {
    match sort_order {
        SortOrder::Date => right
            .note
            .updated_at
            .cmp(&left.note.updated_at)
            .then_with(|| left.note.id.cmp(&right.note.id)),
        SortOrder::Title => title_key(left)
            .cmp(&title_key(right))
            .then_with(|| right.note.updated_at.cmp(&left.note.updated_at)),
    }
}

fn title_key(details: &NoteDetails) -> String {
    details
        .note
        .title
        .as_deref()
        .unwrap_or_default()
        .to_lowercase()
}

/// Read-side service backing the note list.
pub struct NoteListService<'a, R: NoteRepository> {
    repo: R,
    prefs: &'a dyn PrefsStore,
}

impl<'a, R: NoteRepository> NoteListService<'a, R> {
    pub fn new(repo: R, prefs: &'a dyn PrefsStore) -> Self {
        Self { repo, prefs }
    }

    /// Loads every note and groups it using the stored sort order.
    pub fn sections(&self, query: Option<&str>) -> NoteServiceResult<NoteSections> {
        let sort_order = self.prefs.load()?.sort_order;
        let notes = self.repo.list_note_details()?;
        Ok(build_sections(notes, query, sort_order))
    }
}

#[cfg(test)]
mod tests {
    use super::build_sections;
    use crate::model::note::{Note, NoteDetails};
    use crate::model::prefs::SortOrder;

    fn details(title: &str, updated_at: i64) -> NoteDetails {
        let mut note = Note::new();
        note.title = Some(title.to_string());
        note.updated_at = Some(updated_at);
        NoteDetails {
            note,
            checklist_items: Vec::new(),
            tags: Vec::new(),
        }
    }

    fn titles(section: &[NoteDetails]) -> Vec<&str> {
        section
            .iter()
            .map(|details| details.note.title.as_deref().unwrap_or_default())
            .collect()
    }

    #[test]
    fn sections_split_by_flags() {
        let mut pinned = details("pinned", 1);
        pinned.note.is_pinned = true;
        let mut archived = details("archived", 2);
        archived.note.is_archived = true;
        archived.note.reminder_time = Some(50);
        let mut trashed = details("trashed", 3);
        trashed.note.is_deleted = true;
        trashed.note.reminder_time = Some(10);
        let plain = details("plain", 4);

        let sections = build_sections(
            vec![pinned, archived, trashed, plain],
            None,
            SortOrder::Date,
        );

        assert_eq!(titles(&sections.pinned), ["pinned"]);
        assert_eq!(titles(&sections.others), ["plain"]);
        assert_eq!(titles(&sections.archived), ["archived"]);
        assert_eq!(titles(&sections.trash), ["trashed"]);
        assert_eq!(titles(&sections.reminders), ["archived"]);
        assert_eq!(sections.total(), 4);
    }

    #[test]
    fn title_sort_ignores_case() {
        let notes = vec![details("banana", 1), details("Apple", 2), details("cherry", 3)];
        let sections = build_sections(notes, None, SortOrder::Title);
        assert_eq!(titles(&sections.others), ["Apple", "banana", "cherry"]);

        let notes = vec![details("banana", 1), details("Apple", 2), details("cherry", 3)];
        let sections = build_sections(notes, None, SortOrder::Date);
        assert_eq!(titles(&sections.others), ["cherry", "Apple", "banana"]);
    }

    #[test]
    fn blank_query_keeps_everything() {
        let notes = vec![details("one", 1), details("two", 2)];
        let sections = build_sections(notes, Some("   "), SortOrder::Date);
        assert_eq!(sections.others.len(), 2);

        let notes = vec![details("one", 1), details("two", 2)];
        let sections = build_sections(notes, Some("TW"), SortOrder::Date);
        assert_eq!(titles(&sections.others), ["two"]);
    }
}
