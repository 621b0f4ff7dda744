//! Reverse reference index
//!
//! Provides [`ReferenceIndex`], answering "which resources point at this
//! one?" without scanning every field of every resource.

use crate::id::ResourceId;
use crate::resource::Resource;
use indexmap::{IndexMap, IndexSet};

/// Map from a referenced identifier to the resources referring to it
///
/// The owner keeps it current by calling [`ReferenceIndex::insert`] after a
/// resource's fields are settled and [`ReferenceIndex::remove`] before they
/// change. Referrers are kept in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    referrers: IndexMap<ResourceId, IndexSet<ResourceId>>,
}

impl ReferenceIndex {
    /// Create empty index
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index over a set of resources
    #[must_use]
    pub fn build<'a>(resources: impl IntoIterator<Item = &'a Resource>) -> Self {
        let mut index = Self::new();
        for resource in resources {
            index.insert(resource);
        }
        index
    }

    /// Record every outgoing reference of `resource`
    pub fn insert(&mut self, resource: &Resource) {
        for (_, target) in resource.outgoing() {
            if &target == resource.identifier() {
                // self-references never block deletion
                continue;
            }
            self.referrers
                .entry(target)
                .or_default()
                .insert(resource.identifier().clone());
        }
    }

    /// Forget every outgoing reference of `resource`
    pub fn remove(&mut self, resource: &Resource) {
        for (_, target) in resource.outgoing() {
            if let Some(set) = self.referrers.get_mut(&target) {
                set.shift_remove(resource.identifier());
                if set.is_empty() {
                    self.referrers.shift_remove(&target);
                }
            }
        }
    }

    /// Forget `id` both as a target and as a referrer
    pub fn purge(&mut self, id: &ResourceId) {
        self.referrers.shift_remove(id);
        self.referrers.retain(|_, set| {
            set.shift_remove(id);
            !set.is_empty()
        });
    }

    /// Resources currently referring to `id`
    #[must_use]
    pub fn referrers(&self, id: &ResourceId) -> Vec<&ResourceId> {
        self.referrers
            .get(id)
            .map(|set| set.iter().collect())
            .unwrap_or_default()
    }

    /// Whether anything refers to `id`
    #[inline]
    #[must_use]
    pub fn is_referenced(&self, id: &ResourceId) -> bool {
        self.referrers.contains_key(id)
    }

    /// Number of distinct referenced identifiers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.referrers.len()
    }

    /// Whether nothing is referenced
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.referrers.is_empty()
    }
}
