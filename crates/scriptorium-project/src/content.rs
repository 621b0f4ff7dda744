//! Scene content, rendering and structure queries

use crate::error::{ProjectError, ProjectResult};
use crate::events::ProjectEvent;
use crate::history::CommitEntry;
use crate::project::Project;
use scriptorium_model::{Resource, ResourceId, ResourceKind};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

/// One line of a manuscript outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    /// Nesting depth, the manuscript being 0
    pub depth: usize,
    /// Resource identifier
    pub id: ResourceId,
    /// Resource kind
    pub kind: ResourceKind,
    /// Resource title
    pub title: String,
}

impl Project {
    /// Path of a scene's HTML content file
    ///
    /// # Errors
    /// [`ProjectError::UnknownResource`], [`ProjectError::WrongKind`], or
    /// [`ProjectError::InvalidIdentifier`] if the file would leave the project
    pub fn scene_path(&self, id: &ResourceId) -> ProjectResult<PathBuf> {
        self.resource_of(id, ResourceKind::Scene)?;
        self.layout()
            .scene_path(id)
            .ok_or_else(|| ProjectError::InvalidIdentifier(id.clone()))
    }

    /// Current HTML content of a scene
    ///
    /// # Errors
    /// [`ProjectError::ContentMissing`] if the file is absent
    pub fn scene_content(&self, id: &ResourceId) -> ProjectResult<String> {
        let path = self.scene_path(id)?;
        fs::read_to_string(&path).map_err(|e| ProjectError::read_error(&path, e))
    }

    /// Write a scene's HTML content, committing it when it changed
    ///
    /// Returns whether a commit was made.
    ///
    /// # Errors
    /// I/O or history failures
    pub fn save_scene_content(&mut self, id: &ResourceId, html: &str) -> ProjectResult<bool> {
        self.ensure_ready()?;
        let path = self.scene_path(id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ProjectError::io_error(parent, e))?;
        }
        fs::write(&path, html).map_err(|e| ProjectError::io_error(&path, e))?;

        if !self.history().is_modified(&path)? {
            tracing::debug!("Scene {id} unchanged, nothing to commit");
            return Ok(false);
        }
        self.history().stage(&path)?;
        self.history().commit(&format!("Modified scene \"{id}\""))?;
        self.listeners.emit(&ProjectEvent::SceneModified { id: id.clone() });
        Ok(true)
    }

    /// Commits that touched a scene's content file, newest first
    ///
    /// # Errors
    /// [`ProjectError::WrongKind`] for non-scenes; history failures
    pub fn scene_history(&self, id: &ResourceId) -> ProjectResult<Vec<CommitEntry>> {
        let path = self.scene_path(id)?;
        Ok(self.history().entries_for(&path)?)
    }

    /// Raw bytes of an image, read on first access and cached
    ///
    /// # Errors
    /// [`ProjectError::ContentMissing`] if the image file is absent
    pub fn image_bytes(&self, id: &ResourceId) -> ProjectResult<&[u8]> {
        let resource = self.resource_of(id, ResourceKind::Image)?;
        let Some(image) = resource.as_image() else {
            return Err(ProjectError::UnknownResource(id.clone()));
        };
        let path = self
            .layout()
            .image_path(id, &image.format)
            .ok_or_else(|| ProjectError::InvalidIdentifier(id.clone()))?;
        image.bytes(&path).map_err(|e| ProjectError::read_error(&path, e))
    }

    /// Chapter containing a scene
    #[must_use]
    pub fn chapter_of(&self, scene: &ResourceId) -> Option<&Resource> {
        self.references(scene)
            .into_iter()
            .find(|r| r.kind() == ResourceKind::Chapter)
    }

    /// HTML of a resource
    ///
    /// Scenes render their content file; chapters and manuscripts the
    /// concatenation of their members in order, one per line. Other kinds
    /// render nothing. Container cycles are cut.
    ///
    /// # Errors
    /// [`ProjectError::UnknownResource`], or a missing scene file
    pub fn to_html(&self, id: &ResourceId) -> ProjectResult<String> {
        self.render(id, &mut HashSet::new())
    }

    fn render(&self, id: &ResourceId, path: &mut HashSet<ResourceId>) -> ProjectResult<String> {
        let resource = self
            .resource(id)
            .ok_or_else(|| ProjectError::UnknownResource(id.clone()))?;
        match resource.kind() {
            ResourceKind::Scene => self.scene_content(id),
            ResourceKind::Chapter | ResourceKind::Manuscript => {
                if !path.insert(id.clone()) {
                    tracing::warn!("Container cycle through {id}");
                    return Ok(String::new());
                }
                let mut parts = Vec::new();
                for member in resource.as_container().map(|c| c.members()).unwrap_or_default() {
                    let html = self.render(member, path)?;
                    if !html.is_empty() {
                        parts.push(html);
                    }
                }
                path.remove(id);
                Ok(parts.join("\n"))
            }
            _ => Ok(String::new()),
        }
    }

    /// Depth-first outline of the designated manuscript
    #[must_use]
    pub fn outline(&self) -> Vec<OutlineEntry> {
        let mut entries = Vec::new();
        if let Some(manuscript) = self.manuscript() {
            self.walk_outline(manuscript, 0, &mut HashSet::new(), &mut entries);
        }
        entries
    }

    fn walk_outline(
        &self,
        resource: &Resource,
        depth: usize,
        path: &mut HashSet<ResourceId>,
        entries: &mut Vec<OutlineEntry>,
    ) {
        entries.push(OutlineEntry {
            depth,
            id: resource.identifier().clone(),
            kind: resource.kind(),
            title: resource.title().to_string(),
        });
        let Some(container) = resource.as_container() else {
            return;
        };
        if !path.insert(resource.identifier().clone()) {
            return;
        }
        for member in container.members() {
            if let Some(child) = self.resource(member) {
                self.walk_outline(child, depth + 1, path, entries);
            }
        }
        path.remove(resource.identifier());
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ScriptoriumConfig;
    use crate::project::Project;
    use pretty_assertions::assert_eq;
    use scriptorium_model::{ResourceId, ResourceKind};
    use tempfile::TempDir;

    fn project() -> (TempDir, Project) {
        let dir = TempDir::new().unwrap();
        let config = ScriptoriumConfig::new().with_author("Tester", "tester@example.com");
        let project = Project::create(dir.path().join("p"), &config, "P").unwrap();
        (dir, project)
    }

    fn add_to(project: &mut Project, container: &ResourceId, member: &ResourceId) {
        project
            .update(container, |r| r.as_container_mut().unwrap().insert(member.clone(), None))
            .unwrap();
    }

    #[test]
    fn saving_same_content_twice_commits_once() {
        let (_dir, mut project) = project();
        let scene = project.create_resource(ResourceKind::Scene, "S", "").unwrap();
        assert!(project.save_scene_content(&scene, "<p>Hello</p>").unwrap());
        assert!(!project.save_scene_content(&scene, "<p>Hello</p>").unwrap());
        assert_eq!(project.scene_content(&scene).unwrap(), "<p>Hello</p>");

        let messages: Vec<_> = project
            .scene_history(&scene)
            .unwrap()
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(
            messages,
            vec![format!("Modified scene \"{scene}\""), "Created new Scene \"S\"".to_string()]
        );
    }

    #[test]
    fn missing_scene_file_is_reported() {
        let (_dir, mut project) = project();
        let scene = project.create_resource(ResourceKind::Scene, "S", "").unwrap();
        std::fs::remove_file(project.scene_path(&scene).unwrap()).unwrap();
        assert!(project.scene_content(&scene).unwrap_err().is_not_found());
    }

    #[test]
    fn chapter_renders_scenes_in_order() {
        let (_dir, mut project) = project();
        let chapter = project.create_resource(ResourceKind::Chapter, "C", "").unwrap();
        let first = project.create_resource(ResourceKind::Scene, "1", "").unwrap();
        let second = project.create_resource(ResourceKind::Scene, "2", "").unwrap();
        project.save_scene_content(&first, "<p>one</p>").unwrap();
        project.save_scene_content(&second, "<p>two</p>").unwrap();
        add_to(&mut project, &chapter, &second);
        add_to(&mut project, &chapter, &first);

        assert_eq!(project.to_html(&chapter).unwrap(), "<p>two</p>\n<p>one</p>");
        assert_eq!(project.chapter_of(&first).unwrap().identifier(), &chapter);
    }

    #[test]
    fn container_cycles_are_cut() {
        let (_dir, mut project) = project();
        let chapter = project.create_resource(ResourceKind::Chapter, "C", "").unwrap();
        add_to(&mut project, &chapter, &chapter);
        assert_eq!(project.to_html(&chapter).unwrap(), "");
    }

    #[test]
    fn outline_nests_members() {
        let (_dir, mut project) = project();
        let manuscript = project.create_manuscript("Book", "").unwrap();
        let chapter = project.create_resource(ResourceKind::Chapter, "C", "").unwrap();
        let scene = project.create_resource(ResourceKind::Scene, "S", "").unwrap();
        add_to(&mut project, &manuscript, &chapter);
        add_to(&mut project, &chapter, &scene);

        let outline: Vec<_> = project
            .outline()
            .into_iter()
            .map(|e| (e.depth, e.title))
            .collect();
        assert_eq!(
            outline,
            vec![(0, "Book".to_string()), (1, "C".to_string()), (2, "S".to_string())]
        );
    }

    #[test]
    fn image_bytes_are_read_from_the_project() {
        let (dir, mut project) = project();
        let source = dir.path().join("cover.PNG");
        std::fs::write(&source, [1u8, 2, 3]).unwrap();
        let image = project.import_image(&source, "Cover").unwrap();

        let resource = project.resource(&image).unwrap();
        assert_eq!(resource.as_image().unwrap().format, "png");
        assert_eq!(project.image_bytes(&image).unwrap(), &[1, 2, 3]);
    }
}
