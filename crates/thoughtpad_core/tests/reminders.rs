mod common;

use common::{note, now_millis, Fixture};
use thoughtpad_core::reminder::{FALLBACK_REMINDER_BODY, REMINDER_TITLES};

const HOUR_MS: i64 = 60 * 60 * 1000;

#[test]
fn future_reminder_is_scheduled_when_permission_granted() {
    let fx = Fixture::with_notification_permission();
    let fire_at = now_millis() + HOUR_MS;
    let mut record = note("Dentist");
    record.reminder_time = Some(fire_at);

    let saved = fx.service().insert_note_with_details(record, &[], &[]).unwrap();

    let pending = fx.reminders.take_pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].note_id, saved.note.id);
    assert_eq!(pending[0].fire_at, fire_at);
    assert_eq!(pending[0].body, "Dentist");
    assert!(REMINDER_TITLES.contains(&pending[0].notification_title.as_str()));
}

#[test]
fn nothing_is_scheduled_without_permission() {
    let fx = Fixture::new();
    let mut record = note("Dentist");
    record.reminder_time = Some(now_millis() + HOUR_MS);

    fx.service().insert_note_with_details(record, &[], &[]).unwrap();

    assert_eq!(fx.reminders.pending_count(), 0);
}

#[test]
fn past_reminder_is_not_scheduled() {
    let fx = Fixture::with_notification_permission();
    let mut record = note("Yesterday");
    record.reminder_time = Some(now_millis() - HOUR_MS);

    fx.service().insert_note_with_details(record, &[], &[]).unwrap();

    assert_eq!(fx.reminders.pending_count(), 0);
}

#[test]
fn unchanged_reminder_is_not_rescheduled_on_update() {
    let fx = Fixture::with_notification_permission();
    let service = fx.service();
    let mut record = note("Standup");
    record.reminder_time = Some(now_millis() + HOUR_MS);
    let saved = service.insert_note_with_details(record, &[], &[]).unwrap();
    fx.reminders.take_pending().unwrap();

    let mut edited = saved.note.clone();
    edited.text = Some("bring notes".to_string());
    service.update_note_with_details(edited, &[], &[]).unwrap();
    assert_eq!(fx.reminders.pending_count(), 0);

    let mut moved = saved.note.clone();
    moved.reminder_time = Some(now_millis() + 2 * HOUR_MS);
    service.update_note_with_details(moved, &[], &[]).unwrap();
    assert_eq!(fx.reminders.pending_count(), 1);
}

#[test]
fn clearing_or_trashing_cancels_pending_reminder() {
    let fx = Fixture::with_notification_permission();
    let service = fx.service();

    let mut first = note("cleared");
    first.reminder_time = Some(now_millis() + HOUR_MS);
    let first = service.insert_note_with_details(first, &[], &[]).unwrap();
    let mut second = note("trashed");
    second.reminder_time = Some(now_millis() + HOUR_MS);
    let second = service.insert_note_with_details(second, &[], &[]).unwrap();
    assert_eq!(fx.reminders.pending_count(), 2);

    let mut without = first.note.clone();
    without.reminder_time = None;
    service.update_note_with_details(without, &[], &[]).unwrap();
    assert_eq!(fx.reminders.pending_count(), 1);

    service.move_to_trash(second.note.id).unwrap();
    assert_eq!(fx.reminders.pending_count(), 0);
}

#[test]
fn untitled_blank_note_uses_fallback_body() {
    let fx = Fixture::with_notification_permission();
    let mut record = thoughtpad_core::Note::new();
    record.reminder_time = Some(now_millis() + HOUR_MS);

    fx.service().insert_note_with_details(record, &[], &[]).unwrap();

    let pending = fx.reminders.take_pending().unwrap();
    assert_eq!(pending[0].body, FALLBACK_REMINDER_BODY);
}

#[test]
fn restoring_from_trash_schedules_reminder_again() {
    let fx = Fixture::with_notification_permission();
    let service = fx.service();
    let fire_at = now_millis() + HOUR_MS;
    let mut record = note("Renew passport");
    record.reminder_time = Some(fire_at);
    let saved = service.insert_note_with_details(record, &[], &[]).unwrap();

    service.move_to_trash(saved.note.id).unwrap();
    assert_eq!(fx.reminders.pending_count(), 0);

    let restored = service.restore_from_trash(saved.note.id).unwrap();
    assert_eq!(restored.reminder_time, Some(fire_at));
    let pending = fx.reminders.take_pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].note_id, saved.note.id);
    assert_eq!(pending[0].fire_at, fire_at);
}

#[test]
fn restoring_note_with_past_reminder_schedules_nothing() {
    let fx = Fixture::with_notification_permission();
    let service = fx.service();
    let mut record = note("Missed");
    record.reminder_time = Some(now_millis() - HOUR_MS);
    let saved = service.insert_note_with_details(record, &[], &[]).unwrap();
    service.move_to_trash(saved.note.id).unwrap();

    service.restore_from_trash(saved.note.id).unwrap();

    assert_eq!(fx.reminders.pending_count(), 0);
}

#[test]
fn saving_trashed_note_never_schedules() {
    let fx = Fixture::with_notification_permission();
    let service = fx.service();
    let saved = service
        .insert_note_with_details(note("Binned"), &[], &[])
        .unwrap();
    let trashed = service.move_to_trash(saved.note.id).unwrap();

    let mut edited = trashed.clone();
    edited.reminder_time = Some(now_millis() + HOUR_MS);
    service.update_note_with_details(edited, &[], &[]).unwrap();

    assert_eq!(fx.reminders.pending_count(), 0);
}
