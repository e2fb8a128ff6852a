//! Checklist line items owned by a note.

use crate::model::note::NoteId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for checklist items.
pub type CheckListItemId = Uuid;

/// Single line of a checklist note.
///
/// `note_id` is `None` while the item only lives in an unsaved draft; the
/// repository binds it to the owning note on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckListItem {
    pub id: CheckListItemId,
    pub note_id: Option<NoteId>,
    pub text: Option<String>,
    pub is_checked: bool,
}

impl CheckListItem {
    /// Creates an unchecked, unbound item.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            note_id: None,
            text: Some(text.into()),
            is_checked: false,
        }
    }
}
