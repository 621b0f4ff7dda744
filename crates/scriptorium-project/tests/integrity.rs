//! Functional tests for reference integrity on deletion and for change events.
//!
//! Core guarantees exercised here:
//! - After a delete, no remaining resource refers to the deleted identifier,
//!   in memory or on disk.
//! - Single references are cleared; collections lose the member.
//! - Content files owned by the deleted resource are removed.
//! - Every structural change is committed and announced to listeners.

use pretty_assertions::assert_eq;
use scriptorium_model::{ResourceId, ResourceKind};
use scriptorium_project::{ProjectError, ProjectEvent};
use scriptorium_test_utils::{add_member, build_sample_manuscript, connect, reopen, temp_project};
use std::cell::RefCell;
use std::rc::Rc;

/// Tenet: deleting an entity detaches it from every scene.
///
/// The entity is connected to two scenes; after deletion both scenes have
/// empty entity lists, in memory and after a reload.
#[test]
fn deleted_entity_is_detached_from_scenes() {
    let (_dir, mut project) = temp_project("Cast");
    let entity = project.create_resource(ResourceKind::Entity, "Ann", "").unwrap();
    let first = project.create_resource(ResourceKind::Scene, "One", "").unwrap();
    let second = project.create_resource(ResourceKind::Scene, "Two", "").unwrap();
    connect(&mut project, &first, &entity);
    connect(&mut project, &second, &entity);
    assert_eq!(project.references(&entity).len(), 2);

    let removed = project.delete_resource(&entity).unwrap();
    assert_eq!(removed.title(), "Ann");
    assert!(project.resource(&entity).is_none());
    assert!(project.references(&entity).is_empty());
    for scene in [&first, &second] {
        let entities = project.resource(scene).unwrap().as_scene().unwrap().entities();
        assert!(entities.is_empty());
    }

    let loaded = reopen(&project);
    assert!(loaded.resources().all(|r| !r.refers_to(&entity)));
    let history = project.project_history().unwrap();
    assert_eq!(history[0].message, format!("Deleted resource \"{entity}\""));
}

/// Tenet: deleting a scene removes it from its chapter and deletes its file.
#[test]
fn deleted_scene_leaves_chapter_and_disk() {
    let (_dir, mut project) = temp_project("Book");
    let sample = build_sample_manuscript(&mut project);
    let scene = sample.scenes[0].clone();
    let file = project.scene_path(&scene).unwrap();
    assert!(file.exists());

    project.delete_resource(&scene).unwrap();
    assert!(!file.exists());
    let chapter = project.resource(&sample.chapters[0]).unwrap();
    assert_eq!(chapter.as_container().unwrap().members(), &[sample.scenes[1].clone()]);
    assert_eq!(
        project.to_html(&sample.manuscript).unwrap(),
        "<p>Scene 2</p>\n<p>Scene 3</p>"
    );
}

/// Tenet: single references are cleared, not left dangling.
#[test]
fn deleted_cover_and_link_ends_are_cleared() {
    let (dir, mut project) = temp_project("Cover");
    let manuscript = project.create_manuscript("Cover", "").unwrap();
    let source = dir.path().join("cover.jpg");
    std::fs::write(&source, b"jpeg").unwrap();
    let image = project.import_image(&source, "Front").unwrap();
    project
        .update(&manuscript, |r| r.as_manuscript_mut().unwrap().cover = Some(image.clone()))
        .unwrap();
    let ann = project.create_resource(ResourceKind::Entity, "Ann", "").unwrap();
    let link = project.create_link(&image, "depicts", &ann).unwrap();

    project.delete_resource(&image).unwrap();
    assert_eq!(project.manuscript().unwrap().as_manuscript().unwrap().cover, None);
    let link = project.resource(&link).unwrap().as_link().unwrap();
    assert_eq!(link.source, None);
    assert_eq!(link.target.as_ref(), Some(&ann));
    assert!(!project.layout().image_path(&image, "jpg").unwrap().exists());
}

/// Tenet: deleting the designated manuscript clears the designation.
#[test]
fn deleted_manuscript_is_undesignated() {
    let (_dir, mut project) = temp_project("Gone");
    let manuscript = project.create_manuscript("Gone", "").unwrap();
    project.delete_resource(&manuscript).unwrap();
    assert!(project.manuscript().is_none());
    assert!(reopen(&project).manuscript().is_none());
}

/// Tenet: deleting something unknown is a value error, not a silent no-op.
#[test]
fn deleting_unknown_identifier_fails() {
    let (_dir, mut project) = temp_project("Empty");
    let err = project.delete_resource(&ResourceId::from("ghost")).unwrap_err();
    assert!(matches!(err, ProjectError::UnknownResource(_)));
}

/// Tenet: listeners observe every change after it is committed.
#[test]
fn listeners_receive_change_events() {
    let (_dir, mut project) = temp_project("Events");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    project.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    let chapter = project.create_resource(ResourceKind::Chapter, "C", "").unwrap();
    let scene = project.create_resource(ResourceKind::Scene, "S", "").unwrap();
    add_member(&mut project, &chapter, &scene);
    project.save_scene_content(&scene, "<p>x</p>").unwrap();
    project.delete_resource(&scene).unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![
            ProjectEvent::Created { id: chapter.clone(), kind: ResourceKind::Chapter },
            ProjectEvent::Created { id: scene.clone(), kind: ResourceKind::Scene },
            ProjectEvent::Updated { id: chapter.clone() },
            ProjectEvent::SceneModified { id: scene.clone() },
            ProjectEvent::Updated { id: chapter },
            ProjectEvent::Deleted { id: scene, kind: ResourceKind::Scene },
        ]
    );
}

/// Tenet: a delete whose commit fails leaves the project untouched.
///
/// A stale git index lock makes staging fail. The scene stays in its
/// chapter, its file stays on disk, the manuscript keeps its designation,
/// and the descriptor on disk still lists everything.
#[test]
fn failed_delete_commit_rolls_back() {
    let (_dir, mut project) = temp_project("Locked");
    let sample = build_sample_manuscript(&mut project);
    let scene = sample.scenes[0].clone();
    let file = project.scene_path(&scene).unwrap();
    let commits = project.project_history().unwrap().len();
    let lock = project.path().join(".git").join("index.lock");
    std::fs::write(&lock, b"").unwrap();

    assert!(project.delete_resource(&scene).is_err());
    assert!(project.delete_resource(&sample.manuscript).is_err());

    assert!(project.resource(&scene).is_some());
    assert!(file.exists());
    let chapter = project.resource(&sample.chapters[0]).unwrap();
    assert_eq!(
        chapter.as_container().unwrap().members(),
        &[scene.clone(), sample.scenes[1].clone()]
    );
    assert_eq!(project.references(&scene).len(), 1);
    assert_eq!(project.manuscript().unwrap().identifier(), &sample.manuscript);
    assert_eq!(
        project.to_html(&sample.manuscript).unwrap(),
        "<p>Scene 1</p>\n<p>Scene 2</p>\n<p>Scene 3</p>"
    );

    std::fs::remove_file(&lock).unwrap();
    let loaded = reopen(&project);
    assert!(loaded.resource(&scene).is_some());
    assert_eq!(loaded.manuscript().unwrap().identifier(), &sample.manuscript);
    assert_eq!(project.project_history().unwrap().len(), commits);

    project.delete_resource(&scene).unwrap();
    assert!(!file.exists());
}
