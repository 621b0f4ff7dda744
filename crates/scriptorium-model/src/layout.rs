//! On-disk layout of a project directory

use crate::id::{is_plain_file_name, ResourceId};
use std::path::{Path, PathBuf};

/// Default descriptor file name
pub const DEFAULT_DESCRIPTOR: &str = "manuscript.yml";
/// Default scene content directory
pub const DEFAULT_SCENES_DIR: &str = "scenes";
/// Default image directory
pub const DEFAULT_IMAGES_DIR: &str = "images";

/// Paths a project stores its descriptor and content files under
///
/// Resources never hold a pointer to their project; operations that touch
/// disk receive the owning project's layout instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
    descriptor: String,
    scenes_dir: String,
    images_dir: String,
}

impl ProjectLayout {
    /// Layout with the default file and directory names
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            descriptor: DEFAULT_DESCRIPTOR.to_string(),
            scenes_dir: DEFAULT_SCENES_DIR.to_string(),
            images_dir: DEFAULT_IMAGES_DIR.to_string(),
        }
    }

    /// Override the descriptor file name
    #[must_use]
    pub fn with_descriptor(mut self, name: impl Into<String>) -> Self {
        self.descriptor = name.into();
        self
    }

    /// Override the scene content directory name
    #[must_use]
    pub fn with_scenes_dir(mut self, name: impl Into<String>) -> Self {
        self.scenes_dir = name.into();
        self
    }

    /// Override the image directory name
    #[must_use]
    pub fn with_images_dir(mut self, name: impl Into<String>) -> Self {
        self.images_dir = name.into();
        self
    }

    /// Project root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute descriptor path
    #[must_use]
    pub fn descriptor_path(&self) -> PathBuf {
        self.root.join(&self.descriptor)
    }

    /// Scene content directory
    #[must_use]
    pub fn scenes_dir(&self) -> PathBuf {
        self.root.join(&self.scenes_dir)
    }

    /// Image directory
    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(&self.images_dir)
    }

    /// HTML file holding a scene's body
    ///
    /// `None` when the identifier would name a path outside the scene directory.
    #[must_use]
    pub fn scene_path(&self, id: &ResourceId) -> Option<PathBuf> {
        if !id.is_file_safe() {
            return None;
        }
        contained(self.scenes_dir(), &format!("{id}.html"))
    }

    /// Stored image file; extension-less when the format is unknown
    ///
    /// `None` when the identifier or format would leave the image directory.
    #[must_use]
    pub fn image_path(&self, id: &ResourceId, format: &str) -> Option<PathBuf> {
        if !id.is_file_safe() {
            return None;
        }
        if format.is_empty() {
            contained(self.images_dir(), id.as_str())
        } else {
            contained(self.images_dir(), &format!("{id}.{format}"))
        }
    }

    /// Express a path inside the project relative to its root
    ///
    /// Paths outside the root are returned unchanged.
    #[must_use]
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

fn contained(dir: PathBuf, name: &str) -> Option<PathBuf> {
    is_plain_file_name(name).then(|| dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_files_named_by_identifier() {
        let layout = ProjectLayout::new("/lib/p1");
        let path = layout.scene_path(&ResourceId::from("abc")).unwrap();
        assert_eq!(path, PathBuf::from("/lib/p1/scenes/abc.html"));
        assert_eq!(layout.relative(&path), Path::new("scenes/abc.html"));
    }

    #[test]
    fn image_extension_follows_format() {
        let layout = ProjectLayout::new("/p").with_images_dir("img");
        let id = ResourceId::from("cover");
        assert_eq!(layout.image_path(&id, "png"), Some(PathBuf::from("/p/img/cover.png")));
        assert_eq!(layout.image_path(&id, ""), Some(PathBuf::from("/p/img/cover")));
    }

    #[test]
    fn escaping_names_get_no_path() {
        let layout = ProjectLayout::new("/lib/p1");
        assert_eq!(layout.scene_path(&ResourceId::from("../../victim")), None);
        assert_eq!(layout.scene_path(&ResourceId::from("/etc/passwd")), None);
        assert_eq!(layout.image_path(&ResourceId::from(".."), ""), None);
        assert_eq!(layout.image_path(&ResourceId::from("cover"), "/../../x"), None);
    }
}
