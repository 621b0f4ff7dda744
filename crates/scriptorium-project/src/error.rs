//! Error types for projects and libraries
//!
//! Provides error handling for:
//! - Descriptor I/O and YAML decoding
//! - Git history operations
//! - Schema migrations
//! - Structural mutations that would break reference integrity
//! - Library-level project lifecycle

use scriptorium_model::{ResourceError, ResourceId, ResourceKind};
use std::path::PathBuf;

/// Errors raised by the version history
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Underlying libgit2 failure
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// Path does not live inside the project directory
    #[error("path is outside the project: {}", .0.display())]
    OutsideRepository(PathBuf),
}

/// Errors raised while upgrading a descriptor to the current format
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// Stored format is newer than this build understands
    #[error("unsupported format version {found} (newest supported is {supported})")]
    UnsupportedVersion {
        /// Version found on disk
        found: u32,
        /// Newest version this build supports
        supported: u32,
    },

    /// No step registered to leave a version
    #[error("no migration registered from version {from}")]
    MissingStep {
        /// Version lacking a step
        from: u32,
    },

    /// Descriptor does not have the expected structure
    #[error("malformed descriptor: {0}")]
    Malformed(String),

    /// Renaming a field would overwrite an existing one
    #[error("record {identifier} already has a '{field}' field")]
    Conflict {
        /// Offending record identifier
        identifier: String,
        /// Field that already exists
        field: String,
    },
}

/// Main project error type
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// File system failure
    #[error("io error on {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Descriptor could not be encoded or decoded
    #[error("yaml error in {}: {source}", path.display())]
    Yaml {
        /// Descriptor path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_yaml::Error,
    },

    /// Descriptor is readable YAML but not a project descriptor
    #[error("malformed descriptor {}: {reason}", path.display())]
    MalformedDescriptor {
        /// Descriptor path
        path: PathBuf,
        /// What was wrong
        reason: String,
    },

    /// Version history failure
    #[error("history error: {0}")]
    History(#[from] HistoryError),

    /// Migration failure
    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),

    /// Resource model failure
    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Project must be migrated (or is too new) before it can be used
    #[error("project cannot be opened: format version {found}, supported {supported}")]
    NotOpenable {
        /// Version found on disk
        found: u32,
        /// Version this build supports
        supported: u32,
    },

    /// Identifier does not name a resource of this project
    #[error("the resource does not exist: {0}")]
    UnknownResource(ResourceId),

    /// Two descriptor records share an identifier
    #[error("duplicate resource identifier: {0}")]
    DuplicateIdentifier(ResourceId),

    /// Identifier cannot name a file inside the project directory
    #[error("invalid resource identifier \"{0}\"")]
    InvalidIdentifier(ResourceId),

    /// Operation requires a different kind of resource
    #[error("{id} is a {actual}, expected a {expected}")]
    WrongKind {
        /// Resource identifier
        id: ResourceId,
        /// Kind the operation requires
        expected: ResourceKind,
        /// Kind actually found
        actual: ResourceKind,
    },

    /// Field would point at a resource outside the project
    #[error("field '{field}' refers to missing resource {target}")]
    DanglingReference {
        /// Field holding the reference
        field: &'static str,
        /// Missing identifier
        target: ResourceId,
    },

    /// An update tried to change a resource's kind
    #[error("resource {0} cannot change kind")]
    KindChanged(ResourceId),

    /// Content file expected on disk is absent
    #[error("file not found: {}", path.display())]
    ContentMissing {
        /// Expected file path
        path: PathBuf,
    },
}

impl ProjectError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create YAML error for path
    pub fn yaml_error(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Yaml {
            path: path.into(),
            source,
        }
    }

    /// Map a read failure, turning `NotFound` into [`ProjectError::ContentMissing`]
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::ContentMissing { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Whether the error comes from a missing content file
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ContentMissing { .. })
    }
}

/// Errors raised by library operations
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// File system failure
    #[error("io error on {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Project failure
    #[error("project error: {0}")]
    Project(#[from] ProjectError),

    /// No project with this identifier
    #[error("unknown project: {0}")]
    UnknownProject(String),
}

impl LibraryError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for project operations
pub type ProjectResult<T> = Result<T, ProjectError>;
