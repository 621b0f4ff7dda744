//! Scriptorium Resource Model
//!
//! Typed resources that make up a manuscript project, and the declarative
//! schema one generic engine uses to serialize and resolve them.
//!
//! # Core Concepts
//!
//! - [`Resource`]: identifier, title, synopsis and a typed [`ResourceBody`]
//! - [`ResourceKind`]: closed registry mapping record tags to kinds
//! - [`FieldSpec`]: per-kind declaration of scalar, reference and
//!   reference-collection fields
//! - [`ReferenceIndex`]: reverse index answering "who references me"
//! - [`ProjectLayout`]: where a project keeps its descriptor and content files
//!
//! # Example
//!
//! ```rust
//! use scriptorium_model::{FieldValue, Resource, ResourceId, ResourceKind};
//!
//! let mut chapter = Resource::new(ResourceKind::Chapter, ResourceId::generate());
//! chapter.set_title("Arrival");
//! chapter
//!     .assign("content", FieldValue::Collection(vec!["scene-1".into()]))
//!     .unwrap();
//!
//! assert!(chapter.refers_to(&"scene-1".into()));
//! ```

#![warn(unreachable_pub)]

mod error;
mod id;
mod index;
mod kind;
mod layout;
mod resource;
mod schema;
pub mod types;

// Re-exports
pub use error::ResourceError;
pub use id::ResourceId;
pub use index::ReferenceIndex;
pub use kind::ResourceKind;
pub use layout::{ProjectLayout, DEFAULT_DESCRIPTOR, DEFAULT_IMAGES_DIR, DEFAULT_SCENES_DIR};
pub use resource::{Resource, ResourceBody};
pub use schema::{Accepts, FieldKind, FieldSpec, FieldValue};
pub use types::{Chapter, Container, Entity, Image, Link, Manuscript, Scene};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with resources
    pub use crate::{
        FieldValue, ProjectLayout, ReferenceIndex, Resource, ResourceBody, ResourceError,
        ResourceId, ResourceKind,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
