//! Error types for the resource model
//!
//! Covers:
//! - Unknown type tags met while decoding a record
//! - Container lookups on members that are not present
//! - Field assignments that do not match the declared schema

use crate::id::ResourceId;
use crate::kind::ResourceKind;

/// Errors raised by resource and container operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    /// Record tag does not name a known resource kind
    #[error("unknown resource kind: '{0}'")]
    UnknownKind(String),

    /// Resource is not a member of the collection it was looked up in
    #[error("resource {id} not found in '{field}'")]
    NotInCollection {
        /// Missing member
        id: ResourceId,
        /// Collection field that was searched
        field: &'static str,
    },

    /// Field is not declared for this kind
    #[error("{kind} has no field named '{field}'")]
    UnknownField {
        /// Kind of the resource
        kind: ResourceKind,
        /// Requested field name
        field: String,
    },

    /// Value shape does not match the declared field kind
    #[error("field '{field}' of {kind} expects {expected}")]
    FieldMismatch {
        /// Kind of the resource
        kind: ResourceKind,
        /// Field name
        field: &'static str,
        /// Human readable expectation
        expected: &'static str,
    },

    /// Referenced resource has a kind the field does not accept
    #[error("field '{field}' cannot hold a {actual} ({target})")]
    IncompatibleReference {
        /// Field name
        field: &'static str,
        /// Referenced identifier
        target: ResourceId,
        /// Kind of the referenced resource
        actual: ResourceKind,
    },
}

impl ResourceError {
    /// Create lookup error for a collection member
    pub fn not_in_collection(id: impl Into<ResourceId>, field: &'static str) -> Self {
        Self::NotInCollection {
            id: id.into(),
            field,
        }
    }
}
