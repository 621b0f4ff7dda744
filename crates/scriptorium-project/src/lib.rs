//! Scriptorium Projects
//!
//! Persistence, version history and structural integrity for manuscript
//! projects built from [`scriptorium_model`] resources.
//!
//! # Core Concepts
//!
//! - [`Project`]: flat resource set loaded from one YAML descriptor, with
//!   lazy register-before-resolve loading and reverse-reference integrity
//! - [`History`]: Git repository committing every change
//! - [`MigrationChain`]: upgrades older descriptors to [`CURRENT_FORMAT_VERSION`]
//! - [`Library`]: folder whose subdirectories are projects
//!
//! # Example
//!
//! ```rust,no_run
//! use scriptorium_project::{Library, ScriptoriumConfig};
//! use scriptorium_model::ResourceKind;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut library = Library::open("library", ScriptoriumConfig::default())?;
//! let project = library.create_project("My Novel", "")?;
//! let chapter = project.create_resource(ResourceKind::Chapter, "Arrival", "")?;
//! let scene = project.create_resource(ResourceKind::Scene, "At the gate", "")?;
//! project.update(&chapter, |c| {
//!     if let Some(content) = c.as_container_mut() {
//!         content.insert(scene.clone(), None);
//!     }
//! })?;
//! project.save_scene_content(&scene, "<p>It was raining.</p>")?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

mod config;
mod content;
pub mod descriptor;
mod error;
mod events;
mod history;
mod library;
pub mod migration;
mod project;

// Re-exports
pub use config::ScriptoriumConfig;
pub use content::OutlineEntry;
pub use descriptor::{Descriptor, ResourceRecord};
pub use error::{HistoryError, LibraryError, MigrationError, ProjectError, ProjectResult};
pub use events::{Listener, ProjectEvent};
pub use history::{CommitEntry, History, DATETIME_FORMAT};
pub use library::Library;
pub use migration::{Migration, MigrationChain, CURRENT_FORMAT_VERSION};
pub use project::{Project, ProjectStatus};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with projects
    pub use crate::{
        Library, Project, ProjectError, ProjectEvent, ProjectResult, ProjectStatus,
        ScriptoriumConfig,
    };
    pub use scriptorium_model::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
