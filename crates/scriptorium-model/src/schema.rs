//! Declarative field schema
//!
//! Each [`ResourceKind`] lists its fields as [`FieldSpec`]s. One generic
//! engine (serialization, resolution, reference scanning) walks these specs
//! instead of inspecting resources at runtime.

use crate::id::ResourceId;
use crate::kind::ResourceKind;

/// Which resource kinds a reference field may point at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepts {
    /// Any kind
    Any,
    /// Exactly one kind
    Only(ResourceKind),
}

impl Accepts {
    /// Whether a resource of `kind` may be stored
    #[inline]
    #[must_use]
    pub fn contains(self, kind: ResourceKind) -> bool {
        match self {
            Self::Any => true,
            Self::Only(only) => only == kind,
        }
    }
}

/// Shape of a declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, copied verbatim
    Text,
    /// Signed integer, copied verbatim
    Integer,
    /// Optional single reference, stored as an identifier
    Reference(Accepts),
    /// Ordered references, stored as a list of identifiers
    Collection(Accepts),
}

impl FieldKind {
    /// Whether this field can refer to a resource of `kind`
    #[must_use]
    pub fn accepts(self, kind: ResourceKind) -> bool {
        match self {
            Self::Text | Self::Integer => false,
            Self::Reference(accepts) | Self::Collection(accepts) => accepts.contains(kind),
        }
    }

    /// Whether the field holds identifiers
    #[inline]
    #[must_use]
    pub fn is_reference(self) -> bool {
        matches!(self, Self::Reference(_) | Self::Collection(_))
    }

    pub(crate) fn expectation(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "an integer",
            Self::Reference(_) => "a single reference",
            Self::Collection(_) => "a list of references",
        }
    }
}

/// Declared field of a resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key used in descriptor records
    pub name: &'static str,
    /// Value shape
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Declare a field
    #[inline]
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// Value carried by a declared field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text field value
    Text(String),
    /// Integer field value
    Integer(i64),
    /// Single reference (absent when unset)
    Reference(Option<ResourceId>),
    /// Ordered reference list
    Collection(Vec<ResourceId>),
}

impl FieldValue {
    /// Identifiers held by this value, in stored order
    #[must_use]
    pub fn references(&self) -> Vec<&ResourceId> {
        match self {
            Self::Reference(Some(id)) => vec![id],
            Self::Collection(ids) => ids.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Whether the value matches the declared shape
    #[must_use]
    pub fn fits(&self, kind: FieldKind) -> bool {
        matches!(
            (self, kind),
            (Self::Text(_), FieldKind::Text)
                | (Self::Integer(_), FieldKind::Integer)
                | (Self::Reference(_), FieldKind::Reference(_))
                | (Self::Collection(_), FieldKind::Collection(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_fits_declared_kind() {
        assert!(FieldValue::Text("x".into()).fits(FieldKind::Text));
        assert!(!FieldValue::Text("x".into()).fits(FieldKind::Integer));
        assert!(FieldValue::Reference(None).fits(FieldKind::Reference(Accepts::Any)));
        assert!(FieldValue::Collection(vec![]).fits(FieldKind::Collection(Accepts::Any)));
    }

    #[test]
    fn references_keep_order() {
        let value = FieldValue::Collection(vec!["b".into(), "a".into()]);
        let refs: Vec<_> = value.references().into_iter().map(ResourceId::as_str).collect();
        assert_eq!(refs, vec!["b", "a"]);
        assert!(FieldValue::Reference(None).references().is_empty());
    }
}
