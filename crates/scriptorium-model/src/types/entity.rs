//! Entities: characters, locations, props

use super::Fields;
use crate::error::ResourceError;
use crate::kind::ResourceKind;
use crate::schema::FieldValue;

/// Story element tagged with a free-form category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entity {
    /// Category tag such as `character`, `location` or `prop`
    pub category: String,
}

impl Fields for Entity {
    const KIND: ResourceKind = ResourceKind::Entity;

    fn read(&self, name: &str) -> Option<FieldValue> {
        match name {
            "category" => Some(FieldValue::Text(self.category.clone())),
            _ => None,
        }
    }

    fn write(&mut self, name: &'static str, value: FieldValue) -> Result<(), ResourceError> {
        match (name, value) {
            ("category", FieldValue::Text(category)) => {
                self.category = category;
                Ok(())
            }
            _ => Err(Self::mismatch(name, "text")),
        }
    }
}
