//! Tag use-case service.
//!
//! # Invariants
//! - Tag names are trimmed and start with an uppercase letter.
//! - Blank names are rejected.
//! - `delete_tag` hands back the removed tag so callers can undo with
//!   `restore_tag`. Note links are not restored.

use crate::model::tag::{Tag, TagColor, TagId};
use crate::repo::tag_repo::TagRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for tag use-cases.
#[derive(Debug)]
pub enum TagServiceError {
    BlankName,
    TagNotFound(TagId),
    Repo(RepoError),
}

impl Display for TagServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "tag name cannot be blank"),
            Self::TagNotFound(id) => write!(f, "tag not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TagServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TagServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity: "tag", id } => Self::TagNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type TagServiceResult<T> = Result<T, TagServiceError>;

/// Tag service facade over repository implementations.
pub struct TagService<R: TagRepository> {
    repo: R,
}

impl<R: TagRepository> TagService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_tag(&self, name: &str, color: TagColor) -> TagServiceResult<Tag> {
        let tag = Tag::new(normalize_tag_name(name)?).with_color(color);
        self.repo.insert_tag(&tag)?;
        info!("event=tag_create module=service status=ok tag_id={}", tag.id);
        Ok(tag)
    }

    /// Renames or recolors an existing tag.
    pub fn update_tag(&self, tag: &Tag) -> TagServiceResult<Tag> {
        let name = normalize_tag_name(tag.name.as_deref().unwrap_or_default())?;
        let updated = Tag {
            name: Some(name),
            ..tag.clone()
        };
        self.repo.update_tag(&updated)?;
        Ok(updated)
    }

    /// Deletes a tag and returns it for undo.
    pub fn delete_tag(&self, id: TagId) -> TagServiceResult<Tag> {
        let tag = self
            .repo
            .get_tag(id)?
            .ok_or(TagServiceError::TagNotFound(id))?;
        self.repo.delete_tag(id)?;
        info!("event=tag_delete module=service status=ok tag_id={id}");
        Ok(tag)
    }

    /// Re-inserts a previously deleted tag under its original ID.
    pub fn restore_tag(&self, tag: &Tag) -> TagServiceResult<()> {
        self.repo.insert_tag(tag)?;
        Ok(())
    }

    pub fn list_tags(&self) -> TagServiceResult<Vec<Tag>> {
        Ok(self.repo.list_tags()?)
    }

    pub fn find_or_create_tag(&self, name: &str, color: TagColor) -> TagServiceResult<Tag> {
        find_or_create_tag(&self.repo, name, color)
    }
}

/// Returns the stored tag whose name matches `name` ignoring case, or
/// creates one with `color`.
pub fn find_or_create_tag(
    repo: &dyn TagRepository,
    name: &str,
    color: TagColor,
) -> TagServiceResult<Tag> {
    let name = normalize_tag_name(name)?;
    let wanted = name.to_lowercase();
    let existing = repo.list_tags()?.into_iter().find(|tag| {
        tag.name
            .as_deref()
            .is_some_and(|stored| stored.trim().to_lowercase() == wanted)
    });
    if let Some(tag) = existing {
        return Ok(tag);
    }

    let tag = Tag::new(name).with_color(color);
    repo.insert_tag(&tag)?;
    info!("event=tag_create module=service status=ok tag_id={}", tag.id);
    Ok(tag)
}

/// Trims `name` and uppercases its first character.
pub fn normalize_tag_name(name: &str) -> TagServiceResult<String> {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => Ok(first.to_uppercase().chain(chars).collect()),
        None => Err(TagServiceError::BlankName),
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_tag_name, TagServiceError};

    #[test]
    fn normalize_capitalises_first_letter_only() {
        assert_eq!(normalize_tag_name("  work stuff ").unwrap(), "Work stuff");
        assert_eq!(normalize_tag_name("éte").unwrap(), "Éte");
        assert_eq!(normalize_tag_name("ALREADY").unwrap(), "ALREADY");
    }

    #[test]
    fn normalize_rejects_blank() {
        assert!(matches!(
            normalize_tag_name(" \t"),
            Err(TagServiceError::BlankName)
        ));
    }
}
