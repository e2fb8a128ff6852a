//! Note reminders and periodic app-usage nudges.
//!
//! # Responsibility
//! - Decide whether a saved note needs a reminder.
//! - Build notification payloads and hand them to the host scheduler.
//!
//! # Invariants
//! - A reminder is scheduled only for a time strictly in the future that
//!   differs from the previously stored reminder.
//! - At most one pending reminder exists per note in the queued scheduler.

use crate::model::note::{Note, NoteId};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

mod messages;

pub use messages::{periodic_nudge, random_reminder_title, REMINDER_TITLES};

/// Body used when a note has neither title nor text.
pub const FALLBACK_REMINDER_BODY: &str = "Remember to Make Progress Today!";

const PREVIEW_MAX_CHARS: usize = 80;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// A notification to fire for one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    pub note_id: NoteId,
    /// Epoch milliseconds.
    pub fire_at: i64,
    pub notification_title: String,
    pub body: String,
}

impl ReminderRequest {
    /// Builds a request for `note`; returns `None` when it has no reminder.
    pub fn for_note(note: &Note) -> Option<Self> {
        let fire_at = note.reminder_time?;
        Some(Self {
            note_id: note.id,
            fire_at,
            notification_title: random_reminder_title().to_string(),
            body: reminder_body(note),
        })
    }
}

#[derive(Debug)]
pub enum ReminderError {
    Poisoned,
    /// The host refused the request (for example, alarms disabled).
    Rejected(String),
}

impl Display for ReminderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Poisoned => write!(f, "reminder queue lock is poisoned"),
            Self::Rejected(reason) => write!(f, "reminder rejected: {reason}"),
        }
    }
}

impl Error for ReminderError {}

/// Seam to the platform notification/alarm surface.
pub trait ReminderScheduler: Send + Sync {
    /// Schedules `request`, replacing any pending reminder for the same note.
    fn schedule(&self, request: ReminderRequest) -> Result<(), ReminderError>;
    fn cancel(&self, note_id: NoteId) -> Result<(), ReminderError>;
}

/// Returns whether a reminder moving from `previous` to `next` must be
/// scheduled at `now` (all epoch milliseconds).
pub fn should_schedule(previous: Option<i64>, next: Option<i64>, now: i64) -> bool {
    match next {
        Some(next) => previous != Some(next) && next > now,
        None => false,
    }
}

/// Notification body: the title, else a text preview, else the fallback.
pub fn reminder_body(note: &Note) -> String {
    if let Some(title) = note.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        return title.to_string();
    }
    note.text
        .as_deref()
        .map(preview)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| FALLBACK_REMINDER_BODY.to_string())
}

/// Collapses whitespace and truncates to a single short line.
pub fn preview(text: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(text.trim(), " ");
    if collapsed.chars().count() <= PREVIEW_MAX_CHARS {
        return collapsed.into_owned();
    }
    let mut truncated: String = collapsed.chars().take(PREVIEW_MAX_CHARS).collect();
    truncated.push_str("...");
    truncated
}

/// Keeps requests in memory until the host drains them.
#[derive(Debug, Default)]
pub struct QueuedReminderScheduler {
    pending: Mutex<Vec<ReminderRequest>>,
}

impl QueuedReminderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every pending request, ordered by fire time.
    pub fn take_pending(&self) -> Result<Vec<ReminderRequest>, ReminderError> {
        let mut pending = self.pending.lock().map_err(|_| ReminderError::Poisoned)?;
        let mut drained = std::mem::take(&mut *pending);
        drained.sort_by_key(|request| request.fire_at);
        Ok(drained)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().map(|pending| pending.len()).unwrap_or(0)
    }
}

impl ReminderScheduler for QueuedReminderScheduler {
    fn schedule(&self, request: ReminderRequest) -> Result<(), ReminderError> {
        let mut pending = self.pending.lock().map_err(|_| ReminderError::Poisoned)?;
        pending.retain(|existing| existing.note_id != request.note_id);
        pending.push(request);
        Ok(())
    }

    fn cancel(&self, note_id: NoteId) -> Result<(), ReminderError> {
        let mut pending = self.pending.lock().map_err(|_| ReminderError::Poisoned)?;
        pending.retain(|existing| existing.note_id != note_id);
        Ok(())
    }
}
