//! Resource kind registry
//!
//! Maps the `a` tag stored in every descriptor record to one of the closed
//! set of resource kinds, and each kind to its declared field schema.

use crate::error::ResourceError;
use crate::schema::{Accepts, FieldKind, FieldSpec};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Closed set of resource kinds a project can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Root container of a project's prose
    Manuscript,
    /// Ordered container of scenes (or nested containers)
    Chapter,
    /// Leaf content unit with an HTML body
    Scene,
    /// Character, location, prop or other story element
    Entity,
    /// Image file stored under the project's image directory
    Image,
    /// Directed, typed edge between two resources
    Link,
}

const MANUSCRIPT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("content", FieldKind::Collection(Accepts::Any)),
    FieldSpec::new("cover", FieldKind::Reference(Accepts::Only(ResourceKind::Image))),
];

const CHAPTER_FIELDS: &[FieldSpec] = &[FieldSpec::new(
    "content",
    FieldKind::Collection(Accepts::Any),
)];

const SCENE_FIELDS: &[FieldSpec] = &[FieldSpec::new(
    "entities",
    FieldKind::Collection(Accepts::Only(ResourceKind::Entity)),
)];

const ENTITY_FIELDS: &[FieldSpec] = &[FieldSpec::new("category", FieldKind::Text)];

const IMAGE_FIELDS: &[FieldSpec] = &[FieldSpec::new("format", FieldKind::Text)];

const LINK_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("source", FieldKind::Reference(Accepts::Any)),
    FieldSpec::new("predicate", FieldKind::Text),
    FieldSpec::new("target", FieldKind::Reference(Accepts::Any)),
    FieldSpec::new("index", FieldKind::Integer),
];

impl ResourceKind {
    /// Every registered kind, in tag order used by listings
    pub const ALL: [ResourceKind; 6] = [
        Self::Manuscript,
        Self::Chapter,
        Self::Scene,
        Self::Entity,
        Self::Image,
        Self::Link,
    ];

    /// Tag written in the `a` field of a descriptor record
    #[inline]
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Manuscript => "Manuscript",
            Self::Chapter => "Chapter",
            Self::Scene => "Scene",
            Self::Entity => "Entity",
            Self::Image => "Image",
            Self::Link => "Link",
        }
    }

    /// Look up a kind by its record tag
    ///
    /// # Errors
    /// Returns [`ResourceError::UnknownKind`] for tags outside the registry
    pub fn from_tag(tag: &str) -> Result<Self, ResourceError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| ResourceError::UnknownKind(tag.to_string()))
    }

    /// Declared type-specific fields, excluding the shared title/synopsis
    #[must_use]
    pub const fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::Manuscript => MANUSCRIPT_FIELDS,
            Self::Chapter => CHAPTER_FIELDS,
            Self::Scene => SCENE_FIELDS,
            Self::Entity => ENTITY_FIELDS,
            Self::Image => IMAGE_FIELDS,
            Self::Link => LINK_FIELDS,
        }
    }

    /// Find a declared field by name
    #[must_use]
    pub fn field(self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|spec| spec.name == name)
    }

    /// Whether resources of this kind hold an ordered `content` collection
    #[inline]
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Manuscript | Self::Chapter)
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ResourceKind {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_roundtrip_through_registry() {
        for kind in ResourceKind::ALL {
            assert_eq!(ResourceKind::from_tag(kind.tag()), Ok(kind));
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(
            ResourceKind::from_tag("Annotation"),
            Err(ResourceError::UnknownKind("Annotation".into()))
        );
    }

    #[test]
    fn scene_entities_only_accept_entities() {
        let spec = ResourceKind::Scene.field("entities").unwrap();
        assert!(spec.kind.accepts(ResourceKind::Entity));
        assert!(!spec.kind.accepts(ResourceKind::Scene));
    }

    #[test]
    fn chapter_content_accepts_nesting() {
        let spec = ResourceKind::Chapter.field("content").unwrap();
        assert!(spec.kind.accepts(ResourceKind::Chapter));
        assert!(spec.kind.accepts(ResourceKind::Scene));
    }

    #[test]
    fn scalar_fields_accept_nothing() {
        let spec = ResourceKind::Entity.field("category").unwrap();
        assert!(!spec.kind.accepts(ResourceKind::Entity));
        assert!(ResourceKind::Entity.field("missing").is_none());
    }
}
