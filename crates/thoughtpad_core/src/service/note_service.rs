//! Note use-case service.
//!
//! # Responsibility
//! - Save notes with their checklist items and tags, stamping timestamps
//!   and normalising text.
//! - Drive reminder scheduling after saves.
//! - Apply single-flag transitions (pin, archive, trash, favorite).
//! - Seal, verify and clear note passwords.
//!
//! # Invariants
//! - Title and text are trimmed before persistence; blank values are
//!   stored as `None`.
//! - A reminder is scheduled only when notification permission is
//!   granted and the reminder changed to a future time.
//! - Trashing or deleting a note cancels its pending reminder; trashed
//!   notes are never scheduled, and restoring one schedules it again.

use crate::crypto::{CryptoError, PasswordCipher};
use crate::model::checklist::{CheckListItem, CheckListItemId};
use crate::model::note::{Note, NoteDetails, NoteId};
use crate::model::tag::TagId;
use crate::prefs::{PrefsError, PrefsStore};
use crate::reminder::{should_schedule, ReminderError, ReminderRequest, ReminderScheduler};
use crate::repo::note_repo::NoteRepository;
use crate::repo::RepoError;
use crate::service::now_millis;
use crate::service::tag_service::TagServiceError;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Password input is empty after trimming.
    BlankPassword,
    /// A password operation ran without a configured cipher.
    CipherUnavailable,
    Repo(RepoError),
    Prefs(PrefsError),
    Crypto(CryptoError),
    Reminder(ReminderError),
    Tag(TagServiceError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::BlankPassword => write!(f, "password cannot be blank"),
            Self::CipherUnavailable => write!(f, "password cipher is not configured"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Prefs(err) => write!(f, "{err}"),
            Self::Crypto(err) => write!(f, "{err}"),
            Self::Reminder(err) => write!(f, "{err}"),
            Self::Tag(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Prefs(err) => Some(err),
            Self::Crypto(err) => Some(err),
            Self::Reminder(err) => Some(err),
            Self::Tag(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "note",
                id,
            } => Self::NoteNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<PrefsError> for NoteServiceError {
    fn from(value: PrefsError) -> Self {
        Self::Prefs(value)
    }
}

impl From<CryptoError> for NoteServiceError {
    fn from(value: CryptoError) -> Self {
        Self::Crypto(value)
    }
}

impl From<TagServiceError> for NoteServiceError {
    fn from(value: TagServiceError) -> Self {
        Self::Tag(value)
    }
}

impl From<ReminderError> for NoteServiceError {
    fn from(value: ReminderError) -> Self {
        Self::Reminder(value)
    }
}

pub type NoteServiceResult<T> = Result<T, NoteServiceError>;

/// Collaborators shared by note use-cases.
///
/// `cipher` may be left out by callers that never touch passwords.
#[derive(Clone, Copy)]
pub struct NoteServiceContext<'a> {
    pub prefs: &'a dyn PrefsStore,
    pub reminders: &'a dyn ReminderScheduler,
    pub cipher: Option<&'a PasswordCipher>,
}

/// Note service facade over repository implementations.
pub struct NoteService<'a, R: NoteRepository> {
    repo: R,
    ctx: NoteServiceContext<'a>,
}

impl<'a, R: NoteRepository> NoteService<'a, R> {
    pub fn new(repo: R, ctx: NoteServiceContext<'a>) -> Self {
        Self { repo, ctx }
    }

    /// Inserts a new note with its children and returns the stored aggregate.
    pub fn insert_note_with_details(
        &self,
        mut note: Note,
        checklist_items: &[CheckListItem],
        tag_ids: &[TagId],
    ) -> NoteServiceResult<NoteDetails> {
        let now = now_millis();
        normalize_text(&mut note);
        note.created_at = Some(note.created_at.unwrap_or(now));
        note.updated_at = Some(now);

        let note_id = self
            .repo
            .insert_note_with_details(&note, checklist_items, tag_ids)?;
        info!("event=note_save module=service status=ok op=insert note_id={note_id}");

        self.sync_reminder(None, &note)?;
        self.read_back(note_id, "inserted note not found in read-back")
    }

    /// Replaces a note and its children, returning the stored aggregate.
    pub fn update_note_with_details(
        &self,
        mut note: Note,
        checklist_items: &[CheckListItem],
        tag_ids: &[TagId],
    ) -> NoteServiceResult<NoteDetails> {
        let previous = self
            .repo
            .get_note(note.id)?
            .ok_or(NoteServiceError::NoteNotFound(note.id))?;

        normalize_text(&mut note);
        note.created_at = note.created_at.or(previous.created_at);
        note.updated_at = Some(now_millis());

        self.repo
            .update_note_with_details(&note, checklist_items, tag_ids)?;
        info!(
            "event=note_save module=service status=ok op=update note_id={}",
            note.id
        );

        self.sync_reminder(previous.reminder_time, &note)?;
        self.read_back(note.id, "updated note not found in read-back")
    }

    pub fn get_note_details(&self, id: NoteId) -> NoteServiceResult<Option<NoteDetails>> {
        Ok(self.repo.get_note_details(id)?)
    }

    /// Every note, trashed and archived included, newest first.
    pub fn list_note_details(&self) -> NoteServiceResult<Vec<NoteDetails>> {
        Ok(self.repo.list_note_details()?)
    }

    /// Hard-deletes a note together with its children.
    pub fn delete_note(&self, id: NoteId) -> NoteServiceResult<()> {
        let removed = self.repo.delete_note_with_details(id)?;
        if removed == 0 {
            return Err(NoteServiceError::NoteNotFound(id));
        }
        self.ctx.reminders.cancel(id)?;
        info!("event=note_delete module=service status=ok note_id={id}");
        Ok(())
    }

    pub fn toggle_pin(&self, id: NoteId) -> NoteServiceResult<Note> {
        self.modify(id, |note| note.is_pinned = !note.is_pinned)
    }

    pub fn toggle_archive(&self, id: NoteId) -> NoteServiceResult<Note> {
        self.modify(id, |note| note.is_archived = !note.is_archived)
    }

    pub fn toggle_favorite(&self, id: NoteId) -> NoteServiceResult<Note> {
        self.modify(id, |note| note.is_favorite = !note.is_favorite)
    }

    pub fn set_pinned(&self, id: NoteId, pinned: bool) -> NoteServiceResult<Note> {
        self.modify(id, |note| note.is_pinned = pinned)
    }

    pub fn set_archived(&self, id: NoteId, archived: bool) -> NoteServiceResult<Note> {
        self.modify(id, |note| note.is_archived = archived)
    }

    /// Moves a note to trash and cancels its pending reminder.
    pub fn move_to_trash(&self, id: NoteId) -> NoteServiceResult<Note> {
        let note = self.modify(id, |note| note.is_deleted = true)?;
        self.ctx.reminders.cancel(id)?;
        Ok(note)
    }

    /// Restores a trashed note and schedules its reminder again if still due.
    pub fn restore_from_trash(&self, id: NoteId) -> NoteServiceResult<Note> {
        let note = self.modify(id, |note| note.is_deleted = false)?;
        self.sync_reminder(None, &note)?;
        Ok(note)
    }

    pub fn set_checklist_item_checked(
        &self,
        item_id: CheckListItemId,
        checked: bool,
    ) -> NoteServiceResult<()> {
        Ok(self.repo.set_checklist_item_checked(item_id, checked)?)
    }

    /// Permanently removes every trashed note. Returns removed count.
    pub fn empty_trash(&self) -> NoteServiceResult<usize> {
        let removed = self.repo.purge_deleted_notes()?;
        info!("event=trash_empty module=service status=ok removed={removed}");
        Ok(removed)
    }

    /// Protects a note with `password`.
    pub fn lock_note(&self, id: NoteId, password: &str) -> NoteServiceResult<Note> {
        let envelope = self.encrypt_password(password)?;
        self.modify(id, move |note| note.password = Some(envelope))
    }

    /// Returns whether `password` opens the note. Unlocked notes always open.
    pub fn unlock_note(&self, id: NoteId, password: &str) -> NoteServiceResult<bool> {
        let note = self
            .repo
            .get_note(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))?;
        let unlocked = match note.password.as_deref() {
            Some(envelope) => self.cipher()?.verify(envelope, password.trim()),
            None => true,
        };
        debug!("event=note_unlock module=service status=ok note_id={id} unlocked={unlocked}");
        Ok(unlocked)
    }

    pub fn remove_password(&self, id: NoteId) -> NoteServiceResult<Note> {
        self.modify(id, |note| note.password = None)
    }

    /// Seals a trimmed, non-blank password into a storable envelope.
    pub fn encrypt_password(&self, password: &str) -> NoteServiceResult<Vec<u8>> {
        let password = password.trim();
        if password.is_empty() {
            return Err(NoteServiceError::BlankPassword);
        }
        Ok(self.cipher()?.encrypt(password.as_bytes())?)
    }

    pub fn decrypt_password(&self, envelope: &[u8]) -> NoteServiceResult<String> {
        let plaintext = self.cipher()?.decrypt(envelope)?;
        String::from_utf8(plaintext)
            .map_err(|_| CryptoError::MalformedEnvelope("password is not valid UTF-8").into())
    }

    fn cipher(&self) -> NoteServiceResult<&'a PasswordCipher> {
        self.ctx.cipher.ok_or(NoteServiceError::CipherUnavailable)
    }

    fn modify(&self, id: NoteId, apply: impl FnOnce(&mut Note)) -> NoteServiceResult<Note> {
        let mut note = self
            .repo
            .get_note(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))?;
        apply(&mut note);
        note.updated_at = Some(now_millis());
        self.repo.update_note(&note)?;
        Ok(note)
    }

    fn read_back(&self, id: NoteId, context: &'static str) -> NoteServiceResult<NoteDetails> {
        self.repo
            .get_note_details(id)?
            .ok_or(NoteServiceError::InconsistentState(context))
    }

    fn sync_reminder(&self, previous: Option<i64>, note: &Note) -> NoteServiceResult<()> {
        if note.is_deleted {
            self.ctx.reminders.cancel(note.id)?;
            return Ok(());
        }
        if note.reminder_time.is_none() {
            if previous.is_some() {
                self.ctx.reminders.cancel(note.id)?;
            }
            return Ok(());
        }
        if !should_schedule(previous, note.reminder_time, now_millis()) {
            return Ok(());
        }
        if !self.ctx.prefs.load()?.is_notification_permissions_granted {
            info!(
                "event=reminder_schedule module=service status=skipped reason=permission_denied note_id={}",
                note.id
            );
            return Ok(());
        }

        if let Some(request) = ReminderRequest::for_note(note) {
            let fire_at = request.fire_at;
            self.ctx.reminders.schedule(request)?;
            info!(
                "event=reminder_schedule module=service status=ok note_id={} fire_at={fire_at}",
                note.id
            );
        }
        Ok(())
    }
}

fn normalize_text(note: &mut Note) {
    note.title = trimmed(note.title.take());
    note.text = trimmed(note.text.take());
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
