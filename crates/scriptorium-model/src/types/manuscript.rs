//! Manuscripts: the root container of a project

use super::{Container, Fields};
use crate::error::ResourceError;
use crate::id::ResourceId;
use crate::kind::ResourceKind;
use crate::schema::FieldValue;

/// Root container of a project's prose
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manuscript {
    /// Chapters (or loose scenes) in reading order
    pub content: Container,
    /// Image used as the book cover
    pub cover: Option<ResourceId>,
}

impl Fields for Manuscript {
    const KIND: ResourceKind = ResourceKind::Manuscript;

    fn read(&self, name: &str) -> Option<FieldValue> {
        match name {
            "content" => Some(FieldValue::Collection(self.content.members().to_vec())),
            "cover" => Some(FieldValue::Reference(self.cover.clone())),
            _ => None,
        }
    }

    fn write(&mut self, name: &'static str, value: FieldValue) -> Result<(), ResourceError> {
        match (name, value) {
            ("content", FieldValue::Collection(ids)) => {
                self.content.replace(ids);
                Ok(())
            }
            ("cover", FieldValue::Reference(id)) => {
                self.cover = id;
                Ok(())
            }
            ("cover", _) => Err(Self::mismatch(name, "a single reference")),
            _ => Err(Self::mismatch(name, "a list of references")),
        }
    }
}
