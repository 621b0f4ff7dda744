//! Scenes: the leaf content units

use super::Fields;
use crate::error::ResourceError;
use crate::id::ResourceId;
use crate::kind::ResourceKind;
use crate::schema::FieldValue;

/// Leaf content unit
///
/// The HTML body lives in a content file next to the descriptor; this
/// payload only records which entities appear in the scene. The chapter a
/// scene belongs to is derived from container membership, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scene {
    entities: Vec<ResourceId>,
}

impl Scene {
    /// Connected entities, in connection order
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[ResourceId] {
        &self.entities
    }

    /// Whether `entity` is connected
    #[inline]
    #[must_use]
    pub fn is_connected_to(&self, entity: &ResourceId) -> bool {
        self.entities.contains(entity)
    }

    /// Connect an entity; connecting twice is a no-op
    pub fn connect_to(&mut self, entity: ResourceId) {
        if !self.entities.contains(&entity) {
            self.entities.push(entity);
        }
    }

    /// Disconnect an entity, returning whether it was connected
    pub fn disconnect_from(&mut self, entity: &ResourceId) -> bool {
        let before = self.entities.len();
        self.entities.retain(|id| id != entity);
        before != self.entities.len()
    }
}

impl Fields for Scene {
    const KIND: ResourceKind = ResourceKind::Scene;

    fn read(&self, name: &str) -> Option<FieldValue> {
        match name {
            "entities" => Some(FieldValue::Collection(self.entities.clone())),
            _ => None,
        }
    }

    fn write(&mut self, name: &'static str, value: FieldValue) -> Result<(), ResourceError> {
        match (name, value) {
            ("entities", FieldValue::Collection(ids)) => {
                self.entities = ids;
                Ok(())
            }
            _ => Err(Self::mismatch(name, "a list of references")),
        }
    }
}
