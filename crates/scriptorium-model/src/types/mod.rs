//! Concrete resource payloads
//!
//! Each payload carries the type-specific fields of one [`ResourceKind`]
//! and exposes them to the generic field engine through [`Fields`].

mod chapter;
mod container;
mod entity;
mod image;
mod link;
mod manuscript;
mod scene;

pub use chapter::Chapter;
pub use container::Container;
pub use entity::Entity;
pub use image::Image;
pub use link::Link;
pub use manuscript::Manuscript;
pub use scene::Scene;

use crate::error::ResourceError;
use crate::kind::ResourceKind;
use crate::schema::FieldValue;

/// Field access used by the generic serialization engine
///
/// `write` is only called with values whose shape already matched the
/// declared [`crate::schema::FieldSpec`].
pub(crate) trait Fields {
    const KIND: ResourceKind;

    fn read(&self, name: &str) -> Option<FieldValue>;

    fn write(&mut self, name: &'static str, value: FieldValue) -> Result<(), ResourceError>;

    fn mismatch(name: &'static str, expected: &'static str) -> ResourceError {
        ResourceError::FieldMismatch {
            kind: Self::KIND,
            field: name,
            expected,
        }
    }
}
