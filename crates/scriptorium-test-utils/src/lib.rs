//! Testing utilities for the Scriptorium workspace
//!
//! Shared fixtures: temporary libraries and projects, a sample manuscript,
//! and legacy descriptors for migration tests.

#![allow(missing_docs)]

use scriptorium_model::{ResourceId, ResourceKind};
use scriptorium_project::{History, Library, Project, ScriptoriumConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Descriptor written before format versioning
pub const V0_DESCRIPTOR: &str = "\
title: Legacy Novel
manuscript: m1
resources:
  - a: Manuscript
    identifier: m1
    title: Legacy Novel
    synopsis: An old book
    chapters: [c1, c2]
  - a: Chapter
    identifier: c1
    title: One
    synopsis: ''
    scenes: [s1, s2]
  - a: Chapter
    identifier: c2
    title: Two
    synopsis: ''
    scenes: [s3]
  - a: Scene
    identifier: s1
    title: Dawn
    synopsis: ''
    entities: [e1]
  - a: Scene
    identifier: s2
    title: Noon
    synopsis: ''
    entities: []
  - a: Scene
    identifier: s3
    title: Dusk
    synopsis: ''
    entities: [e1]
  - a: Entity
    identifier: e1
    title: Ann
    synopsis: ''
    category: person
";

/// [`V0_DESCRIPTOR`] as it would be authored at format version 1
pub const V1_DESCRIPTOR: &str = "\
format_version: 1
title: Legacy Novel
manuscript: m1
resources:
  - a: Manuscript
    identifier: m1
    title: Legacy Novel
    synopsis: An old book
    content: [c1, c2]
  - a: Chapter
    identifier: c1
    title: One
    synopsis: ''
    content: [s1, s2]
  - a: Chapter
    identifier: c2
    title: Two
    synopsis: ''
    content: [s3]
  - a: Scene
    identifier: s1
    title: Dawn
    synopsis: ''
    entities: [e1]
  - a: Scene
    identifier: s2
    title: Noon
    synopsis: ''
    entities: []
  - a: Scene
    identifier: s3
    title: Dusk
    synopsis: ''
    entities: [e1]
  - a: Entity
    identifier: e1
    title: Ann
    synopsis: ''
    category: person
";

pub fn test_config() -> ScriptoriumConfig {
    ScriptoriumConfig::new().with_author("Test Author", "author@example.com")
}

pub fn temp_library() -> (TempDir, Library) {
    let dir = TempDir::new().unwrap();
    let library = Library::open(dir.path(), test_config()).unwrap();
    (dir, library)
}

pub fn temp_project(title: &str) -> (TempDir, Project) {
    let dir = TempDir::new().unwrap();
    let project = Project::create(dir.path().join("project"), &test_config(), title).unwrap();
    (dir, project)
}

/// Reopen a project from disk
pub fn reopen(project: &Project) -> Project {
    Project::open(project.path(), &test_config()).unwrap()
}

/// Write a descriptor into a fresh repository, as an older build would have
pub fn write_project(root: &Path, descriptor: &str) -> PathBuf {
    let config = test_config();
    fs::create_dir_all(root).unwrap();
    let history = History::init(root, &config.author_name, &config.author_email).unwrap();
    let path = config.layout(root).descriptor_path();
    fs::write(&path, descriptor).unwrap();
    history.stage(&path).unwrap();
    history.commit("Created project").unwrap();
    root.to_path_buf()
}

pub fn add_member(project: &mut Project, container: &ResourceId, member: &ResourceId) {
    project
        .update(container, |r| {
            r.as_container_mut()
                .expect("container")
                .insert(member.clone(), None);
        })
        .unwrap();
}

pub fn connect(project: &mut Project, scene: &ResourceId, entity: &ResourceId) {
    project
        .update(scene, |r| r.as_scene_mut().expect("scene").connect_to(entity.clone()))
        .unwrap();
}

/// Identifiers of [`build_sample_manuscript`]'s resources
#[derive(Debug, Clone)]
pub struct SampleManuscript {
    pub manuscript: ResourceId,
    pub chapters: Vec<ResourceId>,
    pub scenes: Vec<ResourceId>,
}

/// One manuscript, two chapters, three scenes with content
///
/// Chapter 1 holds scenes 1 and 2, chapter 2 holds scene 3. Scene `n` has
/// content `<p>Scene n</p>`.
pub fn build_sample_manuscript(project: &mut Project) -> SampleManuscript {
    let manuscript = project.create_manuscript("Book", "A sample").unwrap();
    let chapters: Vec<_> = (1..=2)
        .map(|n| {
            project
                .create_resource(ResourceKind::Chapter, &format!("Chapter {n}"), "")
                .unwrap()
        })
        .collect();
    let scenes: Vec<_> = (1..=3)
        .map(|n| {
            let scene = project
                .create_resource(ResourceKind::Scene, &format!("Scene {n}"), "")
                .unwrap();
            project
                .save_scene_content(&scene, &format!("<p>Scene {n}</p>"))
                .unwrap();
            scene
        })
        .collect();

    for chapter in &chapters {
        add_member(project, &manuscript, chapter);
    }
    add_member(project, &chapters[0], &scenes[0]);
    add_member(project, &chapters[0], &scenes[1]);
    add_member(project, &chapters[1], &scenes[2]);

    SampleManuscript {
        manuscript,
        chapters,
        scenes,
    }
}
