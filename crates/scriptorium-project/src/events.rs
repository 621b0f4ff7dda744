//! Project change notifications

use scriptorium_model::{ResourceId, ResourceKind};

/// Something that changed in a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectEvent {
    /// A resource was created
    Created {
        /// New resource
        id: ResourceId,
        /// Its kind
        kind: ResourceKind,
    },
    /// A resource's fields changed
    Updated {
        /// Changed resource
        id: ResourceId,
    },
    /// A resource was deleted and detached from its referrers
    Deleted {
        /// Former identifier
        id: ResourceId,
        /// Former kind
        kind: ResourceKind,
    },
    /// A scene's content was saved with changes
    SceneModified {
        /// Scene identifier
        id: ResourceId,
    },
    /// The descriptor was upgraded
    Migrated {
        /// Version found on disk
        from: u32,
        /// Version written
        to: u32,
    },
    /// Project title changed
    Renamed {
        /// New title
        title: String,
    },
}

/// Callback receiving project events
pub type Listener = Box<dyn FnMut(&ProjectEvent)>;

#[derive(Default)]
pub(crate) struct Listeners(Vec<Listener>);

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listeners({})", self.0.len())
    }
}

impl Listeners {
    pub(crate) fn push(&mut self, listener: Listener) {
        self.0.push(listener);
    }

    pub(crate) fn emit(&mut self, event: &ProjectEvent) {
        tracing::trace!(?event, "Emitting project event");
        for listener in &mut self.0 {
            listener(event);
        }
    }
}
