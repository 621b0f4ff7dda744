//! Links: explicit directed edges between resources

use super::Fields;
use crate::error::ResourceError;
use crate::id::ResourceId;
use crate::kind::ResourceKind;
use crate::schema::FieldValue;

/// Directed `(source, predicate, target)` edge stored as a resource
///
/// Either endpoint may be cleared when the resource it pointed at is
/// deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    /// Origin of the edge
    pub source: Option<ResourceId>,
    /// Relation name
    pub predicate: String,
    /// Destination of the edge
    pub target: Option<ResourceId>,
    /// Rank among links sharing the same source and predicate
    pub index: i64,
}

impl Link {
    /// Whether both endpoints are still set
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.source.is_some() && self.target.is_some()
    }
}

impl Fields for Link {
    const KIND: ResourceKind = ResourceKind::Link;

    fn read(&self, name: &str) -> Option<FieldValue> {
        match name {
            "source" => Some(FieldValue::Reference(self.source.clone())),
            "predicate" => Some(FieldValue::Text(self.predicate.clone())),
            "target" => Some(FieldValue::Reference(self.target.clone())),
            "index" => Some(FieldValue::Integer(self.index)),
            _ => None,
        }
    }

    fn write(&mut self, name: &'static str, value: FieldValue) -> Result<(), ResourceError> {
        match (name, value) {
            ("source", FieldValue::Reference(id)) => self.source = id,
            ("target", FieldValue::Reference(id)) => self.target = id,
            ("predicate", FieldValue::Text(predicate)) => self.predicate = predicate,
            ("index", FieldValue::Integer(index)) => self.index = index,
            ("source" | "target", _) => return Err(Self::mismatch(name, "a single reference")),
            ("index", _) => return Err(Self::mismatch(name, "an integer")),
            _ => return Err(Self::mismatch(name, "text")),
        }
        Ok(())
    }
}
