//! Ordered collection of member identifiers

use crate::error::ResourceError;
use crate::id::ResourceId;
use std::collections::HashSet;

/// Ordered, duplicate-free list of member resources
///
/// Backs the `content` field of chapters and manuscripts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    members: Vec<ResourceId>,
}

impl Container {
    /// Create empty container
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Members in order
    #[inline]
    #[must_use]
    pub fn members(&self) -> &[ResourceId] {
        &self.members
    }

    /// Number of members
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the container is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `id` is a member
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.members.contains(id)
    }

    /// Position of `id`, if present
    #[must_use]
    pub fn position(&self, id: &ResourceId) -> Option<usize> {
        self.members.iter().position(|member| member == id)
    }

    /// Insert a member
    ///
    /// Appends when `position` is `None` or past the end. A resource that is
    /// already a member is moved rather than duplicated.
    pub fn insert(&mut self, id: ResourceId, position: Option<usize>) {
        if let Some(existing) = self.position(&id) {
            self.members.remove(existing);
        }
        match position {
            Some(index) if index <= self.members.len() => self.members.insert(index, id),
            _ => self.members.push(id),
        }
    }

    /// Remove a member, returning whether it was present
    pub fn remove(&mut self, id: &ResourceId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.members.remove(index);
                true
            }
            None => {
                tracing::warn!("{id} is not a member, nothing removed");
                false
            }
        }
    }

    /// Move `source` to the position `target` currently occupies
    ///
    /// # Errors
    /// Returns [`ResourceError::NotInCollection`] when either is missing
    pub fn splice(&mut self, source: &ResourceId, target: &ResourceId) -> Result<(), ResourceError> {
        let from = self
            .position(source)
            .ok_or_else(|| ResourceError::not_in_collection(source.clone(), "content"))?;
        let to = self
            .position(target)
            .ok_or_else(|| ResourceError::not_in_collection(target.clone(), "content"))?;
        let moved = self.members.remove(from);
        self.members.insert(to, moved);
        Ok(())
    }

    /// Replace every member; repeats keep their first position
    pub(crate) fn replace(&mut self, members: Vec<ResourceId>) {
        self.members = first_occurrences(members);
    }
}

impl From<Vec<ResourceId>> for Container {
    fn from(members: Vec<ResourceId>) -> Self {
        Self {
            members: first_occurrences(members),
        }
    }
}

fn first_occurrences(mut members: Vec<ResourceId>) -> Vec<ResourceId> {
    let mut seen = HashSet::with_capacity(members.len());
    members.retain(|member| {
        let first = seen.insert(member.clone());
        if !first {
            tracing::warn!("Dropping repeated member {member}");
        }
        first
    });
    members
}
