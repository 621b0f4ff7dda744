//! Project: resource arena, persistence and reference integrity
//!
//! A [`Project`] owns every resource of one manuscript project:
//! - Loads the descriptor lazily, registering each resource before its
//!   references are resolved so cyclic references terminate
//! - Keeps a [`ReferenceIndex`] current across every mutation
//! - Writes the descriptor and commits to the history after each change
//! - Refuses mutations until an outdated descriptor is migrated

use crate::config::ScriptoriumConfig;
use crate::descriptor::{self, Descriptor, ResourceRecord};
use crate::error::{MigrationError, ProjectError, ProjectResult};
use crate::events::{Listeners, ProjectEvent};
use crate::history::{CommitEntry, History};
use crate::migration::{MigrationChain, CURRENT_FORMAT_VERSION};
use indexmap::IndexMap;
use scriptorium_model::{
    FieldKind, FieldSpec, FieldValue, Image, Link, ProjectLayout, ReferenceIndex, Resource,
    ResourceBody, ResourceError, ResourceId, ResourceKind,
};
use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Whether a loaded project can be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    /// Descriptor is at the current format
    Ready,
    /// Descriptor is older and must be migrated first
    NeedsMigration {
        /// Version found on disk
        found: u32,
    },
    /// Descriptor is newer than this build
    Unsupported {
        /// Version found on disk
        found: u32,
    },
}

impl ProjectStatus {
    fn for_version(found: u32) -> Self {
        match found.cmp(&CURRENT_FORMAT_VERSION) {
            std::cmp::Ordering::Equal => Self::Ready,
            std::cmp::Ordering::Less => Self::NeedsMigration { found },
            std::cmp::Ordering::Greater => Self::Unsupported { found },
        }
    }

    /// Whether resources are loaded and mutations allowed
    #[inline]
    #[must_use]
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// One manuscript project on disk
#[derive(Debug)]
pub struct Project {
    layout: ProjectLayout,
    history: History,
    title: String,
    status: ProjectStatus,
    manuscript: Option<ResourceId>,
    resources: IndexMap<ResourceId, Resource>,
    pending: HashMap<ResourceId, ResourceRecord>,
    index: ReferenceIndex,
    pub(crate) listeners: Listeners,
}

impl Project {
    /// Open the project in `path`, creating it if the directory does not exist
    ///
    /// # Errors
    /// Any failure while creating or loading the project
    pub fn open(path: impl Into<PathBuf>, config: &ScriptoriumConfig) -> ProjectResult<Self> {
        let layout = config.layout(path);
        if layout.root().exists() {
            Self::load(layout, config)
        } else {
            Self::init(layout, config, "")
        }
    }

    /// Create a new, empty project in `path`
    ///
    /// Creates the directory, its content directories and a repository, then
    /// commits the initial descriptor.
    ///
    /// # Errors
    /// - [`ProjectError::Io`] if the directory cannot be created or already
    ///   holds a descriptor
    /// - [`ProjectError::History`] if the repository cannot be initialized
    pub fn create(
        path: impl Into<PathBuf>,
        config: &ScriptoriumConfig,
        title: &str,
    ) -> ProjectResult<Self> {
        Self::init(config.layout(path), config, title)
    }

    fn init(layout: ProjectLayout, config: &ScriptoriumConfig, title: &str) -> ProjectResult<Self> {
        let descriptor_path = layout.descriptor_path();
        if descriptor_path.exists() {
            return Err(ProjectError::io_error(
                descriptor_path,
                std::io::Error::from(std::io::ErrorKind::AlreadyExists),
            ));
        }
        for dir in [layout.root().to_path_buf(), layout.scenes_dir(), layout.images_dir()] {
            fs::create_dir_all(&dir).map_err(|e| ProjectError::io_error(&dir, e))?;
        }

        let history = History::init(layout.root(), &config.author_name, &config.author_email)?;
        let project = Self::empty(layout, history, title.to_string(), ProjectStatus::Ready);
        project.commit("Created project", &[], &[])?;
        tracing::info!("Created project in {}", project.path().display());
        Ok(project)
    }

    fn load(layout: ProjectLayout, config: &ScriptoriumConfig) -> ProjectResult<Self> {
        let history = History::open(layout.root(), &config.author_name, &config.author_email)?;
        let path = layout.descriptor_path();
        let document = descriptor::read_document(&path)?;

        let (found, title) = {
            let mapping = document.as_mapping().ok_or_else(|| ProjectError::MalformedDescriptor {
                path: path.clone(),
                reason: "not a mapping".into(),
            })?;
            let found = descriptor::stored_version(mapping).map_err(|e| {
                ProjectError::MalformedDescriptor {
                    path: path.clone(),
                    reason: e.to_string(),
                }
            })?;
            let title = mapping
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            (found, title)
        };

        let status = ProjectStatus::for_version(found);
        let mut project = Self::empty(layout, history, title, status);
        if status.is_ready() {
            let mut document = document;
            if let Some(mapping) = document.as_mapping_mut() {
                descriptor::set_version(mapping, found);
            }
            let descriptor: Descriptor = serde_yaml::from_value(document)
                .map_err(|e| ProjectError::yaml_error(&path, e))?;
            project.populate(descriptor)?;
            tracing::info!(
                "Loaded project {} ({} resources)",
                project.identifier(),
                project.len()
            );
        } else {
            tracing::warn!(
                "Project {} uses format version {found}, current is {CURRENT_FORMAT_VERSION}",
                project.identifier()
            );
        }
        Ok(project)
    }

    fn empty(layout: ProjectLayout, history: History, title: String, status: ProjectStatus) -> Self {
        Self {
            layout,
            history,
            title,
            status,
            manuscript: None,
            resources: IndexMap::new(),
            pending: HashMap::new(),
            index: ReferenceIndex::new(),
            listeners: Listeners::default(),
        }
    }

    /// Materialize every record of `descriptor`
    fn populate(&mut self, descriptor: Descriptor) -> ProjectResult<()> {
        for record in &descriptor.resources {
            ResourceKind::from_tag(&record.a)?;
        }

        let mut order = HashMap::with_capacity(descriptor.resources.len());
        let mut ids = Vec::with_capacity(descriptor.resources.len());
        for (position, record) in descriptor.resources.into_iter().enumerate() {
            let id = record.identifier.clone();
            if !id.is_file_safe() {
                return Err(ProjectError::InvalidIdentifier(id));
            }
            if self.pending.insert(id.clone(), record).is_some() {
                return Err(ProjectError::DuplicateIdentifier(id));
            }
            order.insert(id.clone(), position);
            ids.push(id);
        }

        for id in &ids {
            self.get_resource(id);
        }
        // resolution materializes in dependency order
        self.resources.sort_by(|a, _, b, _| order.get(a).cmp(&order.get(b)));
        self.pending.clear();

        self.title = descriptor.title;
        self.manuscript = match descriptor.manuscript {
            Some(id) if self.kind_of(&id) == Some(ResourceKind::Manuscript) => Some(id),
            Some(id) => {
                tracing::warn!("Ignoring manuscript designation {id}: not a manuscript");
                None
            }
            None => None,
        };
        Ok(())
    }

    fn clear(&mut self) {
        self.resources.clear();
        self.pending.clear();
        self.index = ReferenceIndex::new();
        self.manuscript = None;
    }

    /// Resource by identifier, materializing it from the descriptor if needed
    ///
    /// The resource is registered before its references are resolved, so a
    /// reference cycle resolves to the instance under construction. Unknown
    /// identifiers are logged and yield `None`.
    pub fn get_resource(&mut self, id: &ResourceId) -> Option<&Resource> {
        if !self.resources.contains_key(id) {
            self.materialize(id)?;
        }
        self.resources.get(id)
    }

    fn materialize(&mut self, id: &ResourceId) -> Option<()> {
        let Some(record) = self.pending.get(id).cloned() else {
            tracing::error!("Could not find {id} in the descriptor");
            return None;
        };
        let kind = match ResourceKind::from_tag(&record.a) {
            Ok(kind) => kind,
            Err(e) => {
                tracing::error!("Can't create {id}: {e}");
                return None;
            }
        };

        let mut resource = Resource::new(kind, id.clone());
        resource.set_title(record.title.clone());
        resource.set_synopsis(record.synopsis.clone());
        self.resources.insert(id.clone(), resource);

        let mut resolved = Vec::new();
        for spec in kind.fields() {
            let Some(raw) = record.fields.get(spec.name) else {
                continue;
            };
            let value = match spec.kind {
                FieldKind::Text | FieldKind::Integer => {
                    if let Some(value) = descriptor::decode_scalar(spec, raw) {
                        value
                    } else {
                        tracing::warn!("Ignoring unreadable '{}' on {id}", spec.name);
                        continue;
                    }
                }
                FieldKind::Reference(_) => FieldValue::Reference(
                    descriptor::reference_ids(raw)
                        .into_iter()
                        .next()
                        .and_then(|target| self.resolve_reference(id, spec, target)),
                ),
                FieldKind::Collection(_) => FieldValue::Collection(
                    descriptor::reference_ids(raw)
                        .into_iter()
                        .filter_map(|target| self.resolve_reference(id, spec, target))
                        .collect(),
                ),
            };
            resolved.push((spec.name, value));
        }

        let resource = self.resources.get_mut(id)?;
        for (name, value) in resolved {
            if let Err(e) = resource.assign(name, value) {
                tracing::warn!("Ignoring '{name}' on {id}: {e}");
            }
        }
        self.index.insert(resource);
        Some(())
    }

    fn resolve_reference(
        &mut self,
        owner: &ResourceId,
        spec: &FieldSpec,
        target: ResourceId,
    ) -> Option<ResourceId> {
        let Some(resource) = self.get_resource(&target) else {
            tracing::warn!("Dropping dangling reference {target} from {owner}.{}", spec.name);
            return None;
        };
        let kind = resource.kind();
        if !spec.kind.accepts(kind) {
            tracing::warn!(
                "Dropping reference from {owner}.{} to {target}: a {kind} is not accepted",
                spec.name
            );
            return None;
        }
        Some(target)
    }

    // ---- queries ----

    /// Directory name, used as the project identifier in a library
    #[must_use]
    pub fn identifier(&self) -> String {
        self.layout
            .root()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Project directory
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        self.layout.root()
    }

    /// File layout of this project
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Project title
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Load status
    #[inline]
    #[must_use]
    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    /// Designated manuscript
    #[must_use]
    pub fn manuscript(&self) -> Option<&Resource> {
        self.manuscript.as_ref().and_then(|id| self.resources.get(id))
    }

    /// Resource by identifier
    #[inline]
    #[must_use]
    pub fn resource(&self, id: &ResourceId) -> Option<&Resource> {
        self.resources.get(id)
    }

    /// Resource by identifier, checked against the expected kind
    ///
    /// # Errors
    /// [`ProjectError::UnknownResource`] or [`ProjectError::WrongKind`]
    pub fn resource_of(&self, id: &ResourceId, kind: ResourceKind) -> ProjectResult<&Resource> {
        let resource = self
            .resources
            .get(id)
            .ok_or_else(|| ProjectError::UnknownResource(id.clone()))?;
        if resource.kind() == kind {
            Ok(resource)
        } else {
            Err(ProjectError::WrongKind {
                id: id.clone(),
                expected: kind,
                actual: resource.kind(),
            })
        }
    }

    fn kind_of(&self, id: &ResourceId) -> Option<ResourceKind> {
        self.resources.get(id).map(Resource::kind)
    }

    /// Whether `id` names a resource of this project
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.resources.contains_key(id)
    }

    /// Every resource, in descriptor order
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Resources of one kind, in descriptor order
    pub fn resources_of(&self, kind: ResourceKind) -> impl Iterator<Item = &Resource> {
        self.resources.values().filter(move |r| r.kind() == kind)
    }

    /// Every scene
    pub fn scenes(&self) -> impl Iterator<Item = &Resource> {
        self.resources_of(ResourceKind::Scene)
    }

    /// Every chapter
    pub fn chapters(&self) -> impl Iterator<Item = &Resource> {
        self.resources_of(ResourceKind::Chapter)
    }

    /// Every entity
    pub fn entities(&self) -> impl Iterator<Item = &Resource> {
        self.resources_of(ResourceKind::Entity)
    }

    /// Every image
    pub fn images(&self) -> impl Iterator<Item = &Resource> {
        self.resources_of(ResourceKind::Image)
    }

    /// Every link
    pub fn links(&self) -> impl Iterator<Item = &Resource> {
        self.resources_of(ResourceKind::Link)
    }

    /// Number of resources
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the project has no resources
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resources holding a reference to `id`
    #[must_use]
    pub fn references(&self, id: &ResourceId) -> Vec<&Resource> {
        self.index
            .referrers(id)
            .into_iter()
            .filter_map(|referrer| self.resources.get(referrer))
            .collect()
    }

    /// Links whose source is `id`, by index
    #[must_use]
    pub fn links_from(&self, id: &ResourceId) -> Vec<&Resource> {
        self.links_matching(|link| link.source.as_ref() == Some(id))
    }

    /// Links whose target is `id`, by index
    #[must_use]
    pub fn links_to(&self, id: &ResourceId) -> Vec<&Resource> {
        self.links_matching(|link| link.target.as_ref() == Some(id))
    }

    fn links_matching(&self, matches: impl Fn(&Link) -> bool) -> Vec<&Resource> {
        let mut links: Vec<&Resource> = self
            .links()
            .filter(|r| r.as_link().is_some_and(&matches))
            .collect();
        links.sort_by_key(|r| r.as_link().map_or(0, |link| link.index));
        links
    }

    /// Full commit history, newest first
    ///
    /// # Errors
    /// [`ProjectError::History`] on repository failure
    pub fn project_history(&self) -> ProjectResult<Vec<CommitEntry>> {
        Ok(self.history.entries()?)
    }

    pub(crate) fn history(&self) -> &History {
        &self.history
    }

    /// Register a listener for project events
    pub fn subscribe(&mut self, listener: impl FnMut(&ProjectEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // ---- mutations ----

    pub(crate) fn ensure_ready(&self) -> ProjectResult<()> {
        match self.status {
            ProjectStatus::Ready => Ok(()),
            ProjectStatus::NeedsMigration { found } | ProjectStatus::Unsupported { found } => {
                Err(ProjectError::NotOpenable {
                    found,
                    supported: CURRENT_FORMAT_VERSION,
                })
            }
        }
    }

    /// Create a resource of `kind`
    ///
    /// Scenes get an empty content file. The descriptor is saved and the
    /// change committed as `Created new <Kind> "<title>"`.
    ///
    /// # Errors
    /// I/O, YAML or history failures; [`ProjectError::NotOpenable`] before migration
    pub fn create_resource(
        &mut self,
        kind: ResourceKind,
        title: &str,
        synopsis: &str,
    ) -> ProjectResult<ResourceId> {
        let id = self.insert_new(ResourceBody::empty(kind), title, synopsis, None)?;
        self.announce_new(&id)
    }

    /// Create a manuscript and designate it as the project's manuscript
    ///
    /// # Errors
    /// Same as [`Project::create_resource`]
    pub fn create_manuscript(&mut self, title: &str, synopsis: &str) -> ProjectResult<ResourceId> {
        let id = self.insert_new(ResourceBody::empty(ResourceKind::Manuscript), title, synopsis, None)?;
        self.manuscript = Some(id.clone());
        if self.title.is_empty() {
            self.title = title.to_string();
        }
        self.announce_new(&id)
    }

    /// Create a link `source predicate target`
    ///
    /// The link's index counts the links already leaving `source` with the
    /// same predicate, and its title reads `"<source> <predicate> <target>"`.
    ///
    /// # Errors
    /// [`ProjectError::UnknownResource`] if either end is missing
    pub fn create_link(
        &mut self,
        source: &ResourceId,
        predicate: &str,
        target: &ResourceId,
    ) -> ProjectResult<ResourceId> {
        let title_of = |id: &ResourceId| {
            self.resource(id)
                .map(|r| r.title().to_string())
                .ok_or_else(|| ProjectError::UnknownResource(id.clone()))
        };
        let title = format!("{} {predicate} {}", title_of(source)?, title_of(target)?);
        let existing = self
            .links_from(source)
            .iter()
            .filter(|r| r.as_link().is_some_and(|link| link.predicate == predicate))
            .count();

        let link = Link {
            source: Some(source.clone()),
            predicate: predicate.to_string(),
            target: Some(target.clone()),
            index: i64::try_from(existing).unwrap_or(i64::MAX),
        };
        let id = self.insert_new(ResourceBody::Link(link), &title, "", None)?;
        self.announce_new(&id)
    }

    /// Copy an image file into the project
    ///
    /// The format is the lowercased file extension.
    ///
    /// # Errors
    /// [`ProjectError::ContentMissing`] if `file` does not exist
    pub fn import_image(&mut self, file: &Path, title: &str) -> ProjectResult<ResourceId> {
        if !file.is_file() {
            return Err(ProjectError::ContentMissing {
                path: file.to_path_buf(),
            });
        }
        let format = file
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let id = self.insert_new(ResourceBody::Image(Image::new(format)), title, "", Some(file))?;
        self.announce_new(&id)
    }

    fn allocate_id(&self) -> ResourceId {
        loop {
            let id = ResourceId::generate();
            if !self.resources.contains_key(&id) {
                return id;
            }
        }
    }

    fn insert_new(
        &mut self,
        body: ResourceBody,
        title: &str,
        synopsis: &str,
        payload: Option<&Path>,
    ) -> ProjectResult<ResourceId> {
        self.ensure_ready()?;
        let mut resource = Resource::with_body(self.allocate_id(), body);
        resource.set_title(title);
        resource.set_synopsis(synopsis);
        self.validate_references(&resource)?;
        self.write_payload(&resource, payload)?;

        let id = resource.identifier().clone();
        self.index.insert(&resource);
        self.resources.insert(id.clone(), resource);
        Ok(id)
    }

    fn write_payload(&self, resource: &Resource, payload: Option<&Path>) -> ProjectResult<()> {
        for path in resource.data_files(&self.layout) {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| ProjectError::io_error(parent, e))?;
            }
            match payload {
                Some(source) => {
                    fs::copy(source, &path).map_err(|e| ProjectError::read_error(source, e))?;
                }
                None if !path.exists() => {
                    fs::File::create(&path).map_err(|e| ProjectError::io_error(&path, e))?;
                }
                None => {}
            }
        }
        Ok(())
    }

    fn announce_new(&mut self, id: &ResourceId) -> ProjectResult<ResourceId> {
        let resource = self
            .resources
            .get(id)
            .ok_or_else(|| ProjectError::UnknownResource(id.clone()))?;
        let kind = resource.kind();
        let message = format!("Created new {kind} \"{}\"", resource.title());
        let files = resource.data_files(&self.layout);

        self.commit(&message, &files, &[])?;
        tracing::info!("Created {kind} {id}");
        self.listeners.emit(&ProjectEvent::Created {
            id: id.clone(),
            kind,
        });
        Ok(id.clone())
    }

    fn validate_references(&self, resource: &Resource) -> ProjectResult<()> {
        for (spec, target) in resource.outgoing() {
            let kind = if &target == resource.identifier() {
                resource.kind()
            } else {
                self.kind_of(&target)
                    .ok_or_else(|| ProjectError::DanglingReference {
                        field: spec.name,
                        target: target.clone(),
                    })?
            };
            if !spec.kind.accepts(kind) {
                return Err(ResourceError::IncompatibleReference {
                    field: spec.name,
                    target,
                    actual: kind,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Edit a resource in place, then save and commit
    ///
    /// References written by `edit` are validated; on failure the resource
    /// is restored and nothing is saved. An edit that changes nothing is not
    /// committed.
    ///
    /// # Errors
    /// - [`ProjectError::UnknownResource`] if `id` is not in the project
    /// - [`ProjectError::DanglingReference`] or [`ProjectError::Resource`] for
    ///   invalid references
    /// - [`ProjectError::KindChanged`] if `edit` replaced the payload kind
    pub fn update<R>(
        &mut self,
        id: &ResourceId,
        edit: impl FnOnce(&mut Resource) -> R,
    ) -> ProjectResult<R> {
        self.ensure_ready()?;
        let resource = self
            .resources
            .get_mut(id)
            .ok_or_else(|| ProjectError::UnknownResource(id.clone()))?;
        let before = resource.clone();
        let output = edit(resource);
        let after = resource.clone();
        if after == before {
            return Ok(output);
        }

        let check = if after.kind() == before.kind() {
            self.validate_references(&after)
        } else {
            Err(ProjectError::KindChanged(id.clone()))
        };
        if let Err(e) = check {
            self.resources.insert(id.clone(), before);
            return Err(e);
        }

        self.index.remove(&before);
        self.index.insert(&after);
        self.commit(&format!("Updated resource \"{id}\""), &[], &[])?;
        self.listeners.emit(&ProjectEvent::Updated { id: id.clone() });
        Ok(output)
    }

    /// Delete a resource and detach it from everything referring to it
    ///
    /// Single references to it are cleared and collections lose it, so no
    /// remaining resource refers to a missing identifier. Owned content
    /// files are removed. Everything lands in one commit; if the commit
    /// fails the project is left as it was.
    ///
    /// # Errors
    /// [`ProjectError::UnknownResource`] if `id` is not in the project;
    /// I/O, YAML or history failures
    pub fn delete_resource(&mut self, id: &ResourceId) -> ProjectResult<Resource> {
        self.ensure_ready()?;
        let index_before = self.index.clone();
        let manuscript_before = self.manuscript.clone();
        let Some((position, _, resource)) = self.resources.shift_remove_full(id) else {
            return Err(ProjectError::UnknownResource(id.clone()));
        };

        let referrers: Vec<ResourceId> = self.index.referrers(id).into_iter().cloned().collect();
        let mut detached = Vec::with_capacity(referrers.len());
        for referrer in &referrers {
            if let Some(other) = self.resources.get_mut(referrer) {
                detached.push(other.clone());
                other.detach(id);
            }
        }
        self.index.remove(&resource);
        self.index.purge(id);
        if self.manuscript.as_ref() == Some(id) {
            self.manuscript = None;
        }

        let files = resource.data_files(&self.layout);
        if let Err(e) = self.commit(&format!("Deleted resource \"{id}\""), &[], &files) {
            self.resources.shift_insert(position, id.clone(), resource);
            for original in detached {
                self.resources.insert(original.identifier().clone(), original);
            }
            self.index = index_before;
            self.manuscript = manuscript_before;
            if let Err(resync) = self.restage(&files) {
                tracing::error!("Could not restore {} on disk: {resync}", self.identifier());
            }
            return Err(e);
        }

        for file in &files {
            if let Err(e) = fs::remove_file(file) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Could not remove {}: {e}", file.display());
                }
            }
        }
        tracing::info!(
            "Deleted {} {id}, detached from {} referrer(s)",
            resource.kind(),
            referrers.len()
        );
        for referrer in referrers {
            self.listeners.emit(&ProjectEvent::Updated { id: referrer });
        }
        self.listeners.emit(&ProjectEvent::Deleted {
            id: id.clone(),
            kind: resource.kind(),
        });
        Ok(resource)
    }

    /// Designate an existing manuscript
    ///
    /// # Errors
    /// [`ProjectError::WrongKind`] if `id` is not a manuscript
    pub fn set_manuscript(&mut self, id: &ResourceId) -> ProjectResult<()> {
        self.ensure_ready()?;
        self.resource_of(id, ResourceKind::Manuscript)?;
        if self.manuscript.as_ref() == Some(id) {
            return Ok(());
        }
        self.manuscript = Some(id.clone());
        self.commit(&format!("Designated manuscript \"{id}\""), &[], &[])?;
        Ok(())
    }

    /// Rename the project
    ///
    /// # Errors
    /// I/O, YAML or history failures
    pub fn set_title(&mut self, title: &str) -> ProjectResult<()> {
        self.ensure_ready()?;
        if self.title == title {
            return Ok(());
        }
        self.title = title.to_string();
        self.commit(&format!("Renamed project to \"{title}\""), &[], &[])?;
        self.listeners.emit(&ProjectEvent::Renamed {
            title: title.to_string(),
        });
        Ok(())
    }

    // ---- persistence ----

    /// Encode the descriptor at the current format
    #[must_use]
    pub fn descriptor(&self) -> Descriptor {
        Descriptor {
            format_version: CURRENT_FORMAT_VERSION,
            title: self.title.clone(),
            manuscript: self.manuscript.clone(),
            resources: self.resources.values().map(ResourceRecord::encode).collect(),
        }
    }

    /// Write the descriptor file, returning its path
    ///
    /// # Errors
    /// [`ProjectError::NotOpenable`] before migration; I/O and YAML failures
    pub fn save(&self) -> ProjectResult<PathBuf> {
        self.ensure_ready()?;
        let path = self.layout.descriptor_path();
        self.descriptor().write(&path)?;
        Ok(path)
    }

    fn commit(&self, message: &str, added: &[PathBuf], removed: &[PathBuf]) -> ProjectResult<()> {
        let descriptor = self.save()?;
        self.history.stage(&descriptor)?;
        for path in added {
            self.history.stage(path)?;
        }
        for path in removed {
            self.history.stage_removal(path)?;
        }
        self.history.commit(message)?;
        Ok(())
    }

    /// Write the in-memory state back and stage it along with `files`
    fn restage(&self, files: &[PathBuf]) -> ProjectResult<()> {
        let descriptor = self.save()?;
        self.history.stage(&descriptor)?;
        for path in files.iter().filter(|path| path.exists()) {
            self.history.stage(path)?;
        }
        Ok(())
    }

    // ---- migration ----

    /// Upgrade an outdated descriptor, reporting success
    ///
    /// A project already at the current format succeeds without changes.
    pub fn migrate(&mut self) -> bool {
        match self.try_migrate() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Could not migrate {}: {e}", self.identifier());
                false
            }
        }
    }

    /// Upgrade an outdated descriptor
    ///
    /// Runs the migration chain, loads the result and writes it back in the
    /// current format as one commit.
    ///
    /// # Errors
    /// - [`ProjectError::Migration`] if the descriptor is newer or a step fails
    /// - any load failure of the migrated document
    pub fn try_migrate(&mut self) -> ProjectResult<()> {
        let found = match self.status {
            ProjectStatus::Ready => return Ok(()),
            ProjectStatus::Unsupported { found } => {
                return Err(MigrationError::UnsupportedVersion {
                    found,
                    supported: CURRENT_FORMAT_VERSION,
                }
                .into())
            }
            ProjectStatus::NeedsMigration { found } => found,
        };

        let path = self.layout.descriptor_path();
        let mut document = descriptor::read_document(&path)?;
        MigrationChain::default().migrate(&mut document, CURRENT_FORMAT_VERSION)?;
        let descriptor: Descriptor =
            serde_yaml::from_value(document).map_err(|e| ProjectError::yaml_error(&path, e))?;
        if let Err(e) = self.populate(descriptor) {
            self.clear();
            return Err(e);
        }

        self.status = ProjectStatus::Ready;
        self.commit("Migrated project to new format", &[], &[])?;
        tracing::info!(
            "Migrated {} from format {found} to {CURRENT_FORMAT_VERSION}",
            self.identifier()
        );
        self.listeners.emit(&ProjectEvent::Migrated {
            from: found,
            to: CURRENT_FORMAT_VERSION,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn config() -> ScriptoriumConfig {
        ScriptoriumConfig::new().with_author("Tester", "tester@example.com")
    }

    fn project() -> (TempDir, Project) {
        let dir = TempDir::new().unwrap();
        let project = Project::create(dir.path().join("novel"), &config(), "Novel").unwrap();
        (dir, project)
    }

    #[test]
    fn status_follows_version() {
        assert_eq!(ProjectStatus::for_version(0), ProjectStatus::NeedsMigration { found: 0 });
        assert_eq!(ProjectStatus::for_version(CURRENT_FORMAT_VERSION), ProjectStatus::Ready);
        assert_eq!(ProjectStatus::for_version(9), ProjectStatus::Unsupported { found: 9 });
    }

    #[test]
    fn create_commits_initial_descriptor() {
        let (_dir, project) = project();
        assert!(project.layout().descriptor_path().exists());
        assert!(project.layout().scenes_dir().is_dir());
        let history = project.project_history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].message, "Created project");
    }

    #[test]
    fn create_twice_fails() {
        let (dir, _project) = project();
        let err = Project::create(dir.path().join("novel"), &config(), "Again").unwrap_err();
        assert!(matches!(err, ProjectError::Io { .. }));
    }

    #[test]
    fn scenes_get_an_empty_content_file() {
        let (_dir, mut project) = project();
        let id = project.create_resource(ResourceKind::Scene, "Opening", "").unwrap();
        let path = project.layout().scene_path(&id).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "");
        let history = project.project_history().unwrap();
        assert_eq!(history[0].message, "Created new Scene \"Opening\"");
    }

    #[test]
    fn link_index_counts_same_predicate() {
        let (_dir, mut project) = project();
        let ann = project.create_resource(ResourceKind::Entity, "Ann", "").unwrap();
        let bob = project.create_resource(ResourceKind::Entity, "Bob", "").unwrap();
        let cat = project.create_resource(ResourceKind::Entity, "Cat", "").unwrap();

        let first = project.create_link(&ann, "knows", &bob).unwrap();
        let second = project.create_link(&ann, "knows", &cat).unwrap();
        let other = project.create_link(&ann, "owns", &cat).unwrap();

        let index = |id| project.resource(id).unwrap().as_link().unwrap().index;
        assert_eq!((index(&first), index(&second), index(&other)), (0, 1, 0));
        assert_eq!(project.resource(&first).unwrap().title(), "Ann knows Bob");
        assert_eq!(project.links_to(&cat).len(), 2);
    }

    #[test]
    fn update_rejects_dangling_reference_and_restores() {
        let (_dir, mut project) = project();
        let scene = project.create_resource(ResourceKind::Scene, "S", "").unwrap();
        let err = project
            .update(&scene, |r| {
                r.set_title("Changed");
                r.as_scene_mut().unwrap().connect_to("ghost".into());
            })
            .unwrap_err();
        assert!(matches!(err, ProjectError::DanglingReference { field: "entities", .. }));
        assert_eq!(project.resource(&scene).unwrap().title(), "S");
    }

    #[test]
    fn update_rejects_incompatible_reference() {
        let (_dir, mut project) = project();
        let scene = project.create_resource(ResourceKind::Scene, "S", "").unwrap();
        let chapter = project.create_resource(ResourceKind::Chapter, "C", "").unwrap();
        let err = project
            .update(&scene, |r| r.as_scene_mut().unwrap().connect_to(chapter.clone()))
            .unwrap_err();
        assert!(matches!(
            err,
            ProjectError::Resource(ResourceError::IncompatibleReference { .. })
        ));
    }

    #[test]
    fn noop_update_does_not_commit() {
        let (_dir, mut project) = project();
        let scene = project.create_resource(ResourceKind::Scene, "S", "").unwrap();
        let before = project.project_history().unwrap().len();
        project.update(&scene, |r| r.set_title("S")).unwrap();
        assert_eq!(project.project_history().unwrap().len(), before);
    }

    #[test]
    fn unknown_resource_errors() {
        let (_dir, mut project) = project();
        let ghost = ResourceId::from("ghost");
        assert!(matches!(
            project.delete_resource(&ghost),
            Err(ProjectError::UnknownResource(_))
        ));
        assert!(project.get_resource(&ghost).is_none());
    }

    #[test]
    fn set_manuscript_requires_manuscript() {
        let (_dir, mut project) = project();
        let chapter = project.create_resource(ResourceKind::Chapter, "C", "").unwrap();
        assert!(matches!(
            project.set_manuscript(&chapter),
            Err(ProjectError::WrongKind { .. })
        ));
    }
}
