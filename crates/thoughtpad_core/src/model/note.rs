//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record and its display color.
//! - Provide the aggregate read model combining a note with checklist
//!   items and tags.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `is_deleted` marks a note as trashed; trashed notes stay restorable
//!   until purged.
//! - `password`, when set, holds an encrypted envelope, never plain text.

use crate::model::checklist::CheckListItem;
use crate::model::tag::Tag;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for notes.
pub type NoteId = Uuid;

/// Background palette entry for a note card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteColor {
    #[default]
    Default,
    Blue,
    SoftGreen,
    Green,
    Pink,
    Cyan,
    Coral,
    Yellow,
    Lavender,
    BurntOrange,
}

impl NoteColor {
    /// All palette entries in picker order.
    pub const ALL: [NoteColor; 10] = [
        Self::Default,
        Self::Blue,
        Self::SoftGreen,
        Self::Green,
        Self::Pink,
        Self::Cyan,
        Self::Coral,
        Self::Yellow,
        Self::Lavender,
        Self::BurntOrange,
    ];

    /// Storage name, matching the enum variant.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Blue => "Blue",
            Self::SoftGreen => "SoftGreen",
            Self::Green => "Green",
            Self::Pink => "Pink",
            Self::Cyan => "Cyan",
            Self::Coral => "Coral",
            Self::Yellow => "Yellow",
            Self::Lavender => "Lavender",
            Self::BurntOrange => "BurntOrange",
        }
    }

    /// Parses a storage name. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|color| color.as_str() == value)
    }
}

/// Validation failures for note records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    BlankAttachment { index: usize },
    NegativeReminderTime(i64),
    EmptyPasswordEnvelope,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankAttachment { index } => {
                write!(f, "attachment at position {index} is blank")
            }
            Self::NegativeReminderTime(value) => {
                write!(f, "reminder_time must be non-negative, got {value}")
            }
            Self::EmptyPasswordEnvelope => write!(f, "password envelope cannot be empty"),
        }
    }
}

impl Error for NoteValidationError {}

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: Option<String>,
    pub text: Option<String>,
    /// Epoch milliseconds.
    pub created_at: Option<i64>,
    /// Epoch milliseconds.
    pub updated_at: Option<i64>,
    pub is_pinned: bool,
    pub is_archived: bool,
    pub color: NoteColor,
    /// Trash flag.
    pub is_deleted: bool,
    pub is_favorite: bool,
    pub is_checklist: bool,
    /// Epoch milliseconds at which a reminder should fire.
    pub reminder_time: Option<i64>,
    pub attachments: Vec<String>,
    /// Encrypted password envelope. See `crypto::PasswordCipher`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub password: Option<Vec<u8>>,
}

impl Default for Note {
    fn default() -> Self {
        Self::with_id(Uuid::new_v4())
    }
}

impl Note {
    /// Creates an empty note with a generated stable ID.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty note with a caller-provided ID.
    pub fn with_id(id: NoteId) -> Self {
        Self {
            id,
            title: None,
            text: None,
            created_at: None,
            updated_at: None,
            is_pinned: false,
            is_archived: false,
            color: NoteColor::Default,
            is_deleted: false,
            is_favorite: false,
            is_checklist: false,
            reminder_time: None,
            attachments: Vec::new(),
            password: None,
        }
    }

    /// Whether this note is password protected.
    pub fn is_locked(&self) -> bool {
        self.password.is_some()
    }

    /// Whether the note shows up in the main list (not trashed, not archived).
    pub fn is_active(&self) -> bool {
        !self.is_deleted && !self.is_archived
    }

    /// Whether title and text are both missing or blank.
    pub fn is_blank(&self) -> bool {
        is_blank(self.title.as_deref()) && is_blank(self.text.as_deref())
    }

    /// Validates field-level invariants before persistence.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if let Some(index) = self
            .attachments
            .iter()
            .position(|value| value.trim().is_empty())
        {
            return Err(NoteValidationError::BlankAttachment { index });
        }

        if let Some(value) = self.reminder_time {
            if value < 0 {
                return Err(NoteValidationError::NegativeReminderTime(value));
            }
        }

        if matches!(self.password.as_deref(), Some([])) {
            return Err(NoteValidationError::EmptyPasswordEnvelope);
        }

        Ok(())
    }
}

/// Note aggregate with checklist items and tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDetails {
    pub note: Note,
    pub checklist_items: Vec<CheckListItem>,
    pub tags: Vec<Tag>,
}

impl NoteDetails {
    /// Case-insensitive match against title, text, checklist text and tag names.
    ///
    /// Body text and checklist items of password-protected notes are not
    /// searched; only their title and tags are.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        let contains = |value: Option<&str>| {
            value
                .map(|text| text.to_lowercase().contains(needle.as_str()))
                .unwrap_or(false)
        };

        if contains(self.note.title.as_deref()) {
            return true;
        }
        if self.tags.iter().any(|tag| contains(tag.name.as_deref())) {
            return true;
        }
        if self.note.is_locked() {
            return false;
        }

        contains(self.note.text.as_deref())
            || self
                .checklist_items
                .iter()
                .any(|item| contains(item.text.as_deref()))
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|text| text.trim().is_empty()).unwrap_or(true)
}
