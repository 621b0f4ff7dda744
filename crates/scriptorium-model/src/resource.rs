//! Resource base type and generic field engine
//!
//! A [`Resource`] pairs the shared fields (identifier, title, synopsis) with
//! a typed [`ResourceBody`]. Everything that has to treat resources
//! uniformly (serialization, lazy resolution, reference scanning, detaching
//! deleted resources) goes through the declared schema of the body's kind.

use crate::error::ResourceError;
use crate::id::ResourceId;
use crate::kind::ResourceKind;
use crate::layout::ProjectLayout;
use crate::schema::{FieldSpec, FieldValue};
use crate::types::{Chapter, Container, Entity, Fields, Image, Link, Manuscript, Scene};
use std::path::PathBuf;

/// Typed payload of a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceBody {
    /// Manuscript payload
    Manuscript(Manuscript),
    /// Chapter payload
    Chapter(Chapter),
    /// Scene payload
    Scene(Scene),
    /// Entity payload
    Entity(Entity),
    /// Image payload
    Image(Image),
    /// Link payload
    Link(Link),
}

impl ResourceBody {
    /// Empty payload for a kind
    #[must_use]
    pub fn empty(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Manuscript => Self::Manuscript(Manuscript::default()),
            ResourceKind::Chapter => Self::Chapter(Chapter::default()),
            ResourceKind::Scene => Self::Scene(Scene::default()),
            ResourceKind::Entity => Self::Entity(Entity::default()),
            ResourceKind::Image => Self::Image(Image::default()),
            ResourceKind::Link => Self::Link(Link::default()),
        }
    }

    /// Kind of this payload
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Manuscript(_) => ResourceKind::Manuscript,
            Self::Chapter(_) => ResourceKind::Chapter,
            Self::Scene(_) => ResourceKind::Scene,
            Self::Entity(_) => ResourceKind::Entity,
            Self::Image(_) => ResourceKind::Image,
            Self::Link(_) => ResourceKind::Link,
        }
    }

    fn read(&self, name: &str) -> Option<FieldValue> {
        match self {
            Self::Manuscript(body) => body.read(name),
            Self::Chapter(body) => body.read(name),
            Self::Scene(body) => body.read(name),
            Self::Entity(body) => body.read(name),
            Self::Image(body) => body.read(name),
            Self::Link(body) => body.read(name),
        }
    }

    fn write(&mut self, name: &'static str, value: FieldValue) -> Result<(), ResourceError> {
        match self {
            Self::Manuscript(body) => body.write(name, value),
            Self::Chapter(body) => body.write(name, value),
            Self::Scene(body) => body.write(name, value),
            Self::Entity(body) => body.write(name, value),
            Self::Image(body) => body.write(name, value),
            Self::Link(body) => body.write(name, value),
        }
    }
}

/// Base persisted entity of a project
///
/// The identifier is fixed at construction. Construction never touches
/// disk; content files are created by the owning project as a separate step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    identifier: ResourceId,
    title: String,
    synopsis: String,
    body: ResourceBody,
}

impl Resource {
    /// Create an empty resource of `kind`
    #[must_use]
    pub fn new(kind: ResourceKind, identifier: ResourceId) -> Self {
        Self::with_body(identifier, ResourceBody::empty(kind))
    }

    /// Create a resource around an existing payload
    #[must_use]
    pub fn with_body(identifier: ResourceId, body: ResourceBody) -> Self {
        Self {
            identifier,
            title: String::new(),
            synopsis: String::new(),
            body,
        }
    }

    /// Unique identifier
    #[inline]
    #[must_use]
    pub fn identifier(&self) -> &ResourceId {
        &self.identifier
    }

    /// Kind of the payload
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.body.kind()
    }

    /// Display title
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Set display title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Short description
    #[inline]
    #[must_use]
    pub fn synopsis(&self) -> &str {
        &self.synopsis
    }

    /// Set short description
    pub fn set_synopsis(&mut self, synopsis: impl Into<String>) {
        self.synopsis = synopsis.into();
    }

    /// Typed payload
    #[inline]
    #[must_use]
    pub fn body(&self) -> &ResourceBody {
        &self.body
    }

    /// Mutable typed payload
    #[inline]
    pub fn body_mut(&mut self) -> &mut ResourceBody {
        &mut self.body
    }

    /// Scene payload, if this is a scene
    #[must_use]
    pub fn as_scene(&self) -> Option<&Scene> {
        match &self.body {
            ResourceBody::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    /// Mutable scene payload
    pub fn as_scene_mut(&mut self) -> Option<&mut Scene> {
        match &mut self.body {
            ResourceBody::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    /// Chapter payload, if this is a chapter
    #[must_use]
    pub fn as_chapter(&self) -> Option<&Chapter> {
        match &self.body {
            ResourceBody::Chapter(chapter) => Some(chapter),
            _ => None,
        }
    }

    /// Manuscript payload, if this is a manuscript
    #[must_use]
    pub fn as_manuscript(&self) -> Option<&Manuscript> {
        match &self.body {
            ResourceBody::Manuscript(manuscript) => Some(manuscript),
            _ => None,
        }
    }

    /// Mutable manuscript payload
    pub fn as_manuscript_mut(&mut self) -> Option<&mut Manuscript> {
        match &mut self.body {
            ResourceBody::Manuscript(manuscript) => Some(manuscript),
            _ => None,
        }
    }

    /// Entity payload, if this is an entity
    #[must_use]
    pub fn as_entity(&self) -> Option<&Entity> {
        match &self.body {
            ResourceBody::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Mutable entity payload
    pub fn as_entity_mut(&mut self) -> Option<&mut Entity> {
        match &mut self.body {
            ResourceBody::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Image payload, if this is an image
    #[must_use]
    pub fn as_image(&self) -> Option<&Image> {
        match &self.body {
            ResourceBody::Image(image) => Some(image),
            _ => None,
        }
    }

    /// Link payload, if this is a link
    #[must_use]
    pub fn as_link(&self) -> Option<&Link> {
        match &self.body {
            ResourceBody::Link(link) => Some(link),
            _ => None,
        }
    }

    /// Mutable link payload
    pub fn as_link_mut(&mut self) -> Option<&mut Link> {
        match &mut self.body {
            ResourceBody::Link(link) => Some(link),
            _ => None,
        }
    }

    /// Ordered `content` of a chapter or manuscript
    #[must_use]
    pub fn as_container(&self) -> Option<&Container> {
        match &self.body {
            ResourceBody::Chapter(chapter) => Some(&chapter.content),
            ResourceBody::Manuscript(manuscript) => Some(&manuscript.content),
            _ => None,
        }
    }

    /// Mutable `content` of a chapter or manuscript
    pub fn as_container_mut(&mut self) -> Option<&mut Container> {
        match &mut self.body {
            ResourceBody::Chapter(chapter) => Some(&mut chapter.content),
            ResourceBody::Manuscript(manuscript) => Some(&mut manuscript.content),
            _ => None,
        }
    }

    /// Current value of a declared field
    #[must_use]
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        self.body.read(name)
    }

    /// Every declared field with its current value, in schema order
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static FieldSpec, FieldValue)> {
        self.kind()
            .fields()
            .iter()
            .filter_map(|spec| self.body.read(spec.name).map(|value| (spec, value)))
            .collect()
    }

    /// Assign a declared field
    ///
    /// # Errors
    /// - [`ResourceError::UnknownField`] if the kind declares no such field
    /// - [`ResourceError::FieldMismatch`] if the value has the wrong shape
    pub fn assign(&mut self, name: &str, value: FieldValue) -> Result<(), ResourceError> {
        let kind = self.kind();
        let spec = kind.field(name).ok_or_else(|| ResourceError::UnknownField {
            kind,
            field: name.to_string(),
        })?;
        if !value.fits(spec.kind) {
            return Err(ResourceError::FieldMismatch {
                kind,
                field: spec.name,
                expected: spec.kind.expectation(),
            });
        }
        self.body.write(spec.name, value)
    }

    /// Outgoing references as `(field, target)` pairs, in schema order
    #[must_use]
    pub fn outgoing(&self) -> Vec<(&'static FieldSpec, ResourceId)> {
        self.fields()
            .into_iter()
            .filter(|(spec, _)| spec.kind.is_reference())
            .flat_map(|(spec, value)| {
                value
                    .references()
                    .into_iter()
                    .cloned()
                    .map(move |id| (spec, id))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Whether any reference field of this resource holds `id`
    #[must_use]
    pub fn refers_to(&self, id: &ResourceId) -> bool {
        self.outgoing().iter().any(|(_, target)| target == id)
    }

    /// Drop every reference to `id`
    ///
    /// Single references are cleared, collections lose the member. Returns
    /// whether anything changed.
    pub fn detach(&mut self, id: &ResourceId) -> bool {
        let mut changed = false;
        for spec in self.kind().fields() {
            let Some(value) = self.body.read(spec.name) else {
                continue;
            };
            let replacement = match value {
                FieldValue::Reference(Some(target)) if &target == id => FieldValue::Reference(None),
                FieldValue::Collection(ids) if ids.contains(id) => {
                    FieldValue::Collection(ids.into_iter().filter(|member| member != id).collect())
                }
                _ => continue,
            };
            if self.body.write(spec.name, replacement).is_ok() {
                changed = true;
            }
        }
        changed
    }

    /// Files on disk owned by this resource
    ///
    /// Scenes own their HTML body, images their image file; every other kind
    /// is pure metadata. A name that would leave the layout's directories
    /// owns nothing.
    #[must_use]
    pub fn data_files(&self, layout: &ProjectLayout) -> Vec<PathBuf> {
        let path = match &self.body {
            ResourceBody::Scene(_) => layout.scene_path(&self.identifier),
            ResourceBody::Image(image) => layout.image_path(&self.identifier, &image.format),
            _ => return Vec::new(),
        };
        if path.is_none() {
            tracing::warn!("Resource {} has no file inside the project", self.identifier);
        }
        path.into_iter().collect()
    }
}
