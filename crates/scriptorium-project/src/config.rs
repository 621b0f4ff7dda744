//! Project configuration

use scriptorium_model::{ProjectLayout, DEFAULT_DESCRIPTOR, DEFAULT_IMAGES_DIR, DEFAULT_SCENES_DIR};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings shared by every project a library opens
///
/// Every field has a default, so a partial configuration file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptoriumConfig {
    /// Descriptor file name inside a project directory
    pub descriptor_name: String,
    /// Scene content directory name
    pub scenes_dir: String,
    /// Image directory name
    pub images_dir: String,
    /// Author recorded on history commits
    pub author_name: String,
    /// Author e-mail recorded on history commits
    pub author_email: String,
}

impl ScriptoriumConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With commit author identity
    #[inline]
    #[must_use]
    pub fn with_author(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.author_name = name.into();
        self.author_email = email.into();
        self
    }

    /// With descriptor file name
    #[inline]
    #[must_use]
    pub fn with_descriptor_name(mut self, name: impl Into<String>) -> Self {
        self.descriptor_name = name.into();
        self
    }

    /// Layout of a project rooted at `root`
    #[must_use]
    pub fn layout(&self, root: impl Into<PathBuf>) -> ProjectLayout {
        ProjectLayout::new(root)
            .with_descriptor(self.descriptor_name.clone())
            .with_scenes_dir(self.scenes_dir.clone())
            .with_images_dir(self.images_dir.clone())
    }
}

impl Default for ScriptoriumConfig {
    fn default() -> Self {
        Self {
            descriptor_name: DEFAULT_DESCRIPTOR.to_string(),
            scenes_dir: DEFAULT_SCENES_DIR.to_string(),
            images_dir: DEFAULT_IMAGES_DIR.to_string(),
            author_name: "Scriptorium".to_string(),
            author_email: "scriptorium@localhost".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ScriptoriumConfig = toml::from_str("author_name = \"Ada\"").unwrap();
        assert_eq!(config.author_name, "Ada");
        assert_eq!(config.descriptor_name, "manuscript.yml");
        assert_eq!(config.author_email, "scriptorium@localhost");
    }

    #[test]
    fn layout_uses_configured_names() {
        let config = ScriptoriumConfig::new().with_descriptor_name("project.yml");
        let layout = config.layout("/p");
        assert_eq!(layout.descriptor_path(), PathBuf::from("/p/project.yml"));
        assert_eq!(layout.scenes_dir(), PathBuf::from("/p/scenes"));
    }
}
