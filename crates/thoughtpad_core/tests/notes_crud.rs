mod common;

use common::{note, Fixture};
use rusqlite::Connection;
use thoughtpad_core::{
    CheckListItem, NoteColor, NoteRepository, NoteServiceError, RepoError, SqliteNoteRepository,
    SqliteTagRepository, TagRepository,
};

#[test]
fn insert_then_read_returns_same_record() {
    let fx = Fixture::new();
    let work = fx.tag("Work");
    let mut input = note("  Groceries ");
    input.text = Some("milk\n".to_string());
    input.color = NoteColor::Lavender;
    input.is_checklist = true;
    input.attachments = vec!["content://images/1".to_string()];

    let saved = fx
        .service()
        .insert_note_with_details(
            input.clone(),
            &[CheckListItem::new("eggs"), CheckListItem::new("bread")],
            &[work.id],
        )
        .unwrap();

    assert_eq!(saved.note.id, input.id);
    assert_eq!(saved.note.title.as_deref(), Some("Groceries"));
    assert_eq!(saved.note.text.as_deref(), Some("milk"));
    assert_eq!(saved.note.color, NoteColor::Lavender);
    assert_eq!(saved.note.attachments, input.attachments);
    assert!(saved.note.created_at.is_some());
    assert_eq!(saved.note.created_at, saved.note.updated_at);

    let texts: Vec<_> = saved
        .checklist_items
        .iter()
        .map(|item| item.text.as_deref().unwrap())
        .collect();
    assert_eq!(texts, ["eggs", "bread"]);
    assert!(saved
        .checklist_items
        .iter()
        .all(|item| item.note_id == Some(input.id)));
    assert_eq!(saved.tags, vec![work]);
}

#[test]
fn update_with_details_replaces_child_rows() {
    let fx = Fixture::new();
    let service = fx.service();
    let first_tag = fx.tag("First");
    let second_tag = fx.tag("Second");

    let saved = service
        .insert_note_with_details(
            note("plan"),
            &[CheckListItem::new("a"), CheckListItem::new("b")],
            &[first_tag.id],
        )
        .unwrap();

    let updated = service
        .update_note_with_details(
            saved.note.clone(),
            &[CheckListItem::new("c")],
            &[second_tag.id],
        )
        .unwrap();

    assert_eq!(updated.checklist_items.len(), 1);
    assert_eq!(updated.checklist_items[0].text.as_deref(), Some("c"));
    assert_eq!(updated.tags, vec![second_tag]);
    assert_eq!(updated.note.created_at, saved.note.created_at);

    assert_eq!(fx.count("checklist_items"), 1);
}

#[test]
fn update_missing_note_is_not_found() {
    let fx = Fixture::new();
    let ghost = note("ghost");
    let err = fx
        .service()
        .update_note_with_details(ghost.clone(), &[], &[])
        .unwrap_err();
    assert!(matches!(err, NoteServiceError::NoteNotFound(id) if id == ghost.id));
}

#[test]
fn flag_updates_change_only_targeted_fields() {
    let fx = Fixture::new();
    let service = fx.service();
    let saved = service
        .insert_note_with_details(note("flags"), &[CheckListItem::new("x")], &[])
        .unwrap();
    let id = saved.note.id;

    let pinned = service.toggle_pin(id).unwrap();
    assert!(pinned.is_pinned);
    assert!(!pinned.is_archived);
    assert_eq!(pinned.title, saved.note.title);

    let archived = service.toggle_archive(id).unwrap();
    assert!(archived.is_archived && archived.is_pinned);

    let favorite = service.toggle_favorite(id).unwrap();
    assert!(favorite.is_favorite);

    let unpinned = service.set_pinned(id, false).unwrap();
    assert!(!unpinned.is_pinned && unpinned.is_favorite);

    let details = service.get_note_details(id).unwrap().unwrap();
    assert_eq!(details.checklist_items.len(), 1);
    assert!(details.note.is_archived);
}

#[test]
fn trash_restore_and_empty_trash() {
    let fx = Fixture::new();
    let service = fx.service();
    let kept = service
        .insert_note_with_details(note("kept"), &[], &[])
        .unwrap();
    let trashed = service
        .insert_note_with_details(note("trashed"), &[CheckListItem::new("gone")], &[])
        .unwrap();

    assert!(service.move_to_trash(trashed.note.id).unwrap().is_deleted);
    assert!(!service.restore_from_trash(trashed.note.id).unwrap().is_deleted);
    service.move_to_trash(trashed.note.id).unwrap();

    assert_eq!(service.empty_trash().unwrap(), 1);
    assert!(service.get_note_details(trashed.note.id).unwrap().is_none());
    assert!(service.get_note_details(kept.note.id).unwrap().is_some());

    assert_eq!(fx.count("checklist_items"), 0);
}

#[test]
fn delete_removes_note_and_children() {
    let fx = Fixture::new();
    let service = fx.service();
    let tag = fx.tag("Keep me");
    let saved = service
        .insert_note_with_details(note("doomed"), &[CheckListItem::new("a")], &[tag.id])
        .unwrap();

    service.delete_note(saved.note.id).unwrap();

    assert!(service.get_note_details(saved.note.id).unwrap().is_none());
    assert_eq!(fx.count("note_tags"), 0);
    assert!(SqliteTagRepository::try_new(&fx.conn)
        .unwrap()
        .get_tag(tag.id)
        .unwrap()
        .is_some());

    assert!(matches!(
        service.delete_note(saved.note.id),
        Err(NoteServiceError::NoteNotFound(_))
    ));
}

#[test]
fn checklist_item_check_state_is_persisted() {
    let fx = Fixture::new();
    let service = fx.service();
    let saved = service
        .insert_note_with_details(note("todo"), &[CheckListItem::new("one")], &[])
        .unwrap();
    let item_id = saved.checklist_items[0].id;

    service.set_checklist_item_checked(item_id, true).unwrap();

    let details = service.get_note_details(saved.note.id).unwrap().unwrap();
    assert!(details.checklist_items[0].is_checked);
}

#[test]
fn list_returns_newest_first() {
    let fx = Fixture::new();
    let repo = SqliteNoteRepository::try_new(&fx.conn).unwrap();
    for (title, created_at) in [("old", 1_000), ("new", 3_000), ("mid", 2_000)] {
        let mut record = note(title);
        record.created_at = Some(created_at);
        record.updated_at = Some(created_at);
        repo.insert_note_with_details(&record, &[], &[]).unwrap();
    }

    let titles: Vec<_> = repo
        .list_note_details()
        .unwrap()
        .into_iter()
        .map(|details| details.note.title.unwrap())
        .collect();
    assert_eq!(titles, ["new", "mid", "old"]);
}

#[test]
fn repository_rejects_invalid_note_before_writing() {
    let fx = Fixture::new();
    let repo = SqliteNoteRepository::try_new(&fx.conn).unwrap();
    let mut record = note("bad");
    record.reminder_time = Some(-1);

    assert!(matches!(
        repo.insert_note_with_details(&record, &[], &[]),
        Err(RepoError::Validation(_))
    ));
    assert!(repo.get_note(record.id).unwrap().is_none());
}

#[test]
fn repository_requires_migrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(matches!(
        SqliteNoteRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable(_))
    ));
}
