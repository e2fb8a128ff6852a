//! Tag domain model.
//!
//! # Invariants
//! - A tag can be attached to many notes; detaching never deletes the tag.
//! - Deleting a tag removes its note associations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for tags.
pub type TagId = Uuid;

/// Chip palette entry for a tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagColor {
    Red,
    Orange,
    Yellow,
    Green,
    Teal,
    #[default]
    Blue,
    Purple,
    Brown,
}

impl TagColor {
    /// All palette entries in picker order.
    pub const ALL: [TagColor; 8] = [
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Teal,
        Self::Blue,
        Self::Purple,
        Self::Brown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Orange => "Orange",
            Self::Yellow => "Yellow",
            Self::Green => "Green",
            Self::Teal => "Teal",
            Self::Blue => "Blue",
            Self::Purple => "Purple",
            Self::Brown => "Brown",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|color| color.as_str() == value)
    }
}

/// User-defined label attachable to notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: Option<String>,
    pub color: TagColor,
}

impl Tag {
    /// Creates a tag with a generated ID and the default color.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: Some(name.into()),
            color: TagColor::default(),
        }
    }

    pub fn with_color(mut self, color: TagColor) -> Self {
        self.color = color;
        self
    }
}
