//! Chapters: ordered containers of scenes

use super::{Container, Fields};
use crate::error::ResourceError;
use crate::kind::ResourceKind;
use crate::schema::FieldValue;

/// Ordered container of child resources
///
/// Members are usually scenes, but any resource may be nested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chapter {
    /// Children in reading order
    pub content: Container,
}

impl Fields for Chapter {
    const KIND: ResourceKind = ResourceKind::Chapter;

    fn read(&self, name: &str) -> Option<FieldValue> {
        match name {
            "content" => Some(FieldValue::Collection(self.content.members().to_vec())),
            _ => None,
        }
    }

    fn write(&mut self, name: &'static str, value: FieldValue) -> Result<(), ResourceError> {
        match (name, value) {
            ("content", FieldValue::Collection(ids)) => {
                self.content.replace(ids);
                Ok(())
            }
            _ => Err(Self::mismatch(name, "a list of references")),
        }
    }
}
