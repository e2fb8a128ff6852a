//! Note editor state machine.
//!
//! # Responsibility
//! - Hold the in-progress draft of one note.
//! - Apply editor events and persist the draft through [`NoteService`].
//!
//! # Invariants
//! - Reminder times chosen in the editor have zero seconds and millis.
//! - Reminder date and time edits follow the local time zone.
//! - Tags added by name are stored before they are selected.
//! - Saving an entirely empty new draft persists nothing.
//! - The draft only ever holds an encrypted password, never the input.

use crate::model::checklist::CheckListItem;
use crate::model::note::{Note, NoteColor, NoteDetails, NoteId};
use crate::model::tag::{Tag, TagColor, TagId};
use crate::repo::note_repo::NoteRepository;
use crate::repo::tag_repo::TagRepository;
use crate::service::note_service::{NoteService, NoteServiceError, NoteServiceResult};
use crate::service::now_millis;
use crate::service::tag_service::find_or_create_tag;
use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone, Timelike};
use log::debug;

const DEFAULT_REMINDER_DELAY_MINUTES: i64 = 30;

/// Editable copy of a note and its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub note: Note,
    pub checklist_items: Vec<CheckListItem>,
    pub selected_tags: Vec<Tag>,
    pub has_reminder: bool,
    /// Epoch milliseconds of the chosen reminder.
    pub selected_reminder: Option<i64>,
    pub password_input: Option<String>,
    pub encrypted_password: Option<Vec<u8>>,
    pub is_new: bool,
}

impl NoteDraft {
    pub fn new() -> Self {
        Self {
            note: Note::new(),
            checklist_items: Vec::new(),
            selected_tags: Vec::new(),
            has_reminder: false,
            selected_reminder: None,
            password_input: None,
            encrypted_password: None,
            is_new: true,
        }
    }

    pub fn from_details(details: NoteDetails) -> Self {
        Self {
            has_reminder: details.note.reminder_time.is_some(),
            selected_reminder: details.note.reminder_time,
            encrypted_password: details.note.password.clone(),
            password_input: None,
            checklist_items: details.checklist_items,
            selected_tags: details.tags,
            note: details.note,
            is_new: false,
        }
    }

    /// Whether saving would store nothing meaningful.
    pub fn is_empty(&self) -> bool {
        self.note.is_blank()
            && self
                .checklist_items
                .iter()
                .all(|item| item.text.as_deref().map(str::trim).unwrap_or_default().is_empty())
            && !self.has_reminder
            && self.selected_tags.is_empty()
    }

    /// Note record as it would be persisted.
    fn to_note(&self) -> Note {
        Note {
            reminder_time: if self.has_reminder {
                self.selected_reminder
            } else {
                None
            },
            password: self.encrypted_password.clone(),
            ..self.note.clone()
        }
    }

    fn tag_ids(&self) -> Vec<TagId> {
        self.selected_tags.iter().map(|tag| tag.id).collect()
    }
}

impl Default for NoteDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// User intents raised by the note editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    ChangeTitle(String),
    ChangeText(String),
    ChangeColor(NoteColor),
    SetPinned(bool),
    SetChecklistMode(bool),
    AddChecklistItem(String),
    RemoveChecklistItem(usize),
    SetChecklistItemChecked { index: usize, checked: bool },
    /// Selects the tag, or deselects it when already selected.
    ToggleTagSelection(Tag),
    /// Selects the stored tag named `name` (ignoring case), creating it
    /// when none exists.
    AddTag { name: String, color: TagColor },
    RemoveTag(TagId),
    /// Enabling picks the default reminder time.
    SetReminder(bool),
    /// Keeps the time of day, takes the calendar date of the value.
    ChangeReminderDate(i64),
    /// Keeps the date, takes hour and minute of the value.
    ChangeReminderTime(i64),
    ChangePassword(Option<String>),
    /// Encrypts the pending password input into the draft.
    SecureNote,
    RemovePassword,
    Save,
    Discard,
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutcome {
    /// Draft changed in memory only.
    Updated,
    Saved(NoteId),
    /// Save found nothing to write.
    Unchanged,
    Discarded,
}

/// Drives a [`NoteDraft`] against a note service.
pub struct NoteEditor<'s, 'a, R: NoteRepository> {
    service: &'s NoteService<'a, R>,
    tags: &'s dyn TagRepository,
    draft: NoteDraft,
}

impl<'s, 'a, R: NoteRepository> NoteEditor<'s, 'a, R> {
    /// Starts editing a new, empty note.
    pub fn new(service: &'s NoteService<'a, R>, tags: &'s dyn TagRepository) -> Self {
        Self {
            service,
            tags,
            draft: NoteDraft::new(),
        }
    }

    /// Starts editing an existing note.
    pub fn open(
        service: &'s NoteService<'a, R>,
        tags: &'s dyn TagRepository,
        id: NoteId,
    ) -> NoteServiceResult<Self> {
        let details = service
            .get_note_details(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))?;
        Ok(Self {
            service,
            tags,
            draft: NoteDraft::from_details(details),
        })
    }

    pub fn draft(&self) -> &NoteDraft {
        &self.draft
    }

    pub fn handle(&mut self, event: EditorEvent) -> NoteServiceResult<EditorOutcome> {
        let draft = &mut self.draft;
        match event {
            EditorEvent::ChangeTitle(value) => draft.note.title = Some(value),
            EditorEvent::ChangeText(value) => draft.note.text = Some(value),
            EditorEvent::ChangeColor(color) => draft.note.color = color,
            EditorEvent::SetPinned(value) => draft.note.is_pinned = value,
            EditorEvent::SetChecklistMode(value) => draft.note.is_checklist = value,
            EditorEvent::AddChecklistItem(text) => {
                draft.checklist_items.push(CheckListItem::new(text.trim()));
            }
            EditorEvent::RemoveChecklistItem(index) => {
                if index < draft.checklist_items.len() {
                    draft.checklist_items.remove(index);
                    draft.note.is_checklist = !draft.checklist_items.is_empty();
                }
            }
            EditorEvent::SetChecklistItemChecked { index, checked } => {
                if let Some(item) = draft.checklist_items.get_mut(index) {
                    item.is_checked = checked;
                }
            }
            EditorEvent::ToggleTagSelection(tag) => {
                if let Some(position) = draft.selected_tags.iter().position(|t| t.id == tag.id) {
                    draft.selected_tags.remove(position);
                } else {
                    draft.selected_tags.push(tag);
                }
            }
            EditorEvent::AddTag { name, color } => {
                let tag = find_or_create_tag(self.tags, &name, color)?;
                if !draft.selected_tags.iter().any(|selected| selected.id == tag.id) {
                    draft.selected_tags.push(tag);
                }
            }
            EditorEvent::RemoveTag(id) => draft.selected_tags.retain(|tag| tag.id != id),
            EditorEvent::SetReminder(enabled) => {
                draft.has_reminder = enabled;
                draft.selected_reminder = enabled.then(|| default_reminder_time(now_millis()));
            }
            EditorEvent::ChangeReminderDate(value) => {
                if let Some(next) = draft
                    .selected_reminder
                    .and_then(|current| with_date_of(&Local, current, value))
                {
                    draft.selected_reminder = Some(next);
                }
            }
            EditorEvent::ChangeReminderTime(value) => {
                if let Some(next) = draft
                    .selected_reminder
                    .and_then(|current| with_time_of(&Local, current, value))
                {
                    draft.selected_reminder = Some(next);
                }
            }
            EditorEvent::ChangePassword(value) => draft.password_input = value,
            EditorEvent::SecureNote => {
                let Some(input) = draft.password_input.take() else {
                    return Ok(EditorOutcome::Unchanged);
                };
                draft.encrypted_password = Some(self.service.encrypt_password(&input)?);
            }
            EditorEvent::RemovePassword => {
                draft.password_input = None;
                draft.encrypted_password = None;
            }
            EditorEvent::Save => return self.save(),
            EditorEvent::Discard => return self.discard(),
        }
        Ok(EditorOutcome::Updated)
    }

    fn save(&mut self) -> NoteServiceResult<EditorOutcome> {
        if self.draft.is_new {
            if self.draft.is_empty() {
                debug!("event=editor_save module=service status=skipped reason=empty_draft");
                return Ok(EditorOutcome::Discarded);
            }
            let details = self.service.insert_note_with_details(
                self.draft.to_note(),
                &self.draft.checklist_items,
                &self.draft.tag_ids(),
            )?;
            return Ok(self.reload(details));
        }

        let note = self.draft.to_note();
        let stored = self.service.get_note_details(note.id)?;
        if let Some(stored) = stored {
            if !self.differs_from(&stored) {
                return Ok(EditorOutcome::Unchanged);
            }
        }

        let details = self.service.update_note_with_details(
            note,
            &self.draft.checklist_items,
            &self.draft.tag_ids(),
        )?;
        Ok(self.reload(details))
    }

    fn discard(&mut self) -> NoteServiceResult<EditorOutcome> {
        if !self.draft.is_new {
            self.service.delete_note(self.draft.note.id)?;
        }
        self.draft = NoteDraft::new();
        Ok(EditorOutcome::Discarded)
    }

    fn differs_from(&self, stored: &NoteDetails) -> bool {
        let mut candidate = self.draft.to_note();
        candidate.updated_at = stored.note.updated_at;
        let items_differ = self.draft.checklist_items.len() != stored.checklist_items.len()
            || self
                .draft
                .checklist_items
                .iter()
                .zip(&stored.checklist_items)
                .any(|(left, right)| left.text != right.text || left.is_checked != right.is_checked);

        candidate != stored.note || items_differ || self.draft.tag_ids() != stored_tag_ids(stored)
    }

    fn reload(&mut self, details: NoteDetails) -> EditorOutcome {
        let id = details.note.id;
        self.draft = NoteDraft::from_details(details);
        EditorOutcome::Saved(id)
    }
}

fn stored_tag_ids(details: &NoteDetails) -> Vec<TagId> {
    details.tags.iter().map(|tag| tag.id).collect()
}

/// `now + 30 min` in local time, with seconds zeroed.
pub fn default_reminder_time(now: i64) -> i64 {
    default_reminder_in(&Local, now).unwrap_or(now)
}

fn default_reminder_in<Tz: TimeZone>(tz: &Tz, now: i64) -> Option<i64> {
    let at = local_time(tz, now)? + TimeDelta::minutes(DEFAULT_REMINDER_DELAY_MINUTES);
    resolve(tz, at.naive_local().with_second(0)?.with_nanosecond(0)?)
}

/// Keeps the wall-clock time of `current` on the calendar date of `date`.
fn with_date_of<Tz: TimeZone>(tz: &Tz, current: i64, date: i64) -> Option<i64> {
    let current = local_time(tz, current)?;
    let date = local_time(tz, date)?;
    resolve(tz, date.date_naive().and_time(current.time()))
}

/// Keeps the calendar date of `current`, takes hour and minute of `time`.
fn with_time_of<Tz: TimeZone>(tz: &Tz, current: i64, time: i64) -> Option<i64> {
    let current = local_time(tz, current)?;
    let time = local_time(tz, time)?;
    let naive = current
        .date_naive()
        .and_hms_opt(time.hour(), time.minute(), 0)?;
    resolve(tz, naive)
}

fn local_time<Tz: TimeZone>(tz: &Tz, millis: i64) -> Option<DateTime<Tz>> {
    tz.timestamp_millis_opt(millis).single()
}

/// Maps a wall-clock time back to epoch millis. Times skipped by a DST
/// jump move forward one hour; repeated times take the earlier instant.
fn resolve<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<i64> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + TimeDelta::hours(1))).earliest())
        .map(|at| at.timestamp_millis())
}
