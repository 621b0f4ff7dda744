//! Library: a folder of projects

use crate::config::ScriptoriumConfig;
use crate::error::LibraryError;
use crate::project::Project;
use scriptorium_model::ResourceId;
use std::fs;
use std::path::{Path, PathBuf};

/// Every project found in one folder
///
/// Each immediate subdirectory is a project; its directory name is the
/// project identifier.
#[derive(Debug)]
pub struct Library {
    root: PathBuf,
    config: ScriptoriumConfig,
    projects: Vec<Project>,
}

impl Library {
    /// Library over `root`, without scanning it yet
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, config: ScriptoriumConfig) -> Self {
        Self {
            root: root.into(),
            config,
            projects: Vec::new(),
        }
    }

    /// Open `root`, scanning it for projects
    ///
    /// # Errors
    /// [`LibraryError::Io`] if the folder cannot be read
    pub fn open(root: impl Into<PathBuf>, config: ScriptoriumConfig) -> Result<Self, LibraryError> {
        let mut library = Self::new(root, config);
        let root = library.root.clone();
        library.open_folder(&root)?;
        Ok(library)
    }

    /// Point the library at `path` and load every project in it
    ///
    /// The folder is created if missing. Subdirectories that fail to load
    /// are logged and skipped; hidden directories are ignored.
    ///
    /// # Errors
    /// [`LibraryError::Io`] if the folder cannot be created or listed
    pub fn open_folder(&mut self, path: &Path) -> Result<(), LibraryError> {
        fs::create_dir_all(path).map_err(|e| LibraryError::io_error(path, e))?;
        let entries = fs::read_dir(path).map_err(|e| LibraryError::io_error(path, e))?;

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LibraryError::io_error(path, e))?;
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if !hidden && entry.path().is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();

        self.root = path.to_path_buf();
        self.projects.clear();
        for dir in dirs {
            match Project::open(&dir, &self.config) {
                Ok(project) => self.projects.push(project),
                Err(e) => tracing::error!("Skipping {}: {e}", dir.display()),
            }
        }
        tracing::info!(
            "Opened library {} with {} project(s)",
            self.root.display(),
            self.projects.len()
        );
        Ok(())
    }

    /// Create a project in a fresh uniquely named subdirectory
    ///
    /// The project starts with its root manuscript.
    ///
    /// # Errors
    /// Any failure while creating the project
    pub fn create_project(&mut self, title: &str, synopsis: &str) -> Result<&mut Project, LibraryError> {
        let dir = loop {
            let candidate = self.root.join(ResourceId::generate().as_str());
            if !candidate.exists() {
                break candidate;
            }
        };
        let mut project = Project::create(dir, &self.config, title)?;
        project.create_manuscript(title, synopsis)?;
        tracing::info!("Created project {} \"{title}\"", project.identifier());
        self.projects.push(project);
        let last = self.projects.len() - 1;
        Ok(&mut self.projects[last])
    }

    /// Delete a project and its directory
    ///
    /// # Errors
    /// - [`LibraryError::UnknownProject`] if no project has this identifier
    /// - [`LibraryError::Io`] if the directory cannot be removed
    pub fn delete_project(&mut self, identifier: &str) -> Result<(), LibraryError> {
        let position = self
            .projects
            .iter()
            .position(|p| p.identifier() == identifier)
            .ok_or_else(|| LibraryError::UnknownProject(identifier.to_string()))?;
        let project = self.projects.remove(position);
        fs::remove_dir_all(project.path()).map_err(|e| LibraryError::io_error(project.path(), e))?;
        tracing::info!("Deleted project {identifier}");
        Ok(())
    }

    /// Project by identifier
    #[must_use]
    pub fn get_project(&self, identifier: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.identifier() == identifier)
    }

    /// Mutable project by identifier
    pub fn get_project_mut(&mut self, identifier: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.identifier() == identifier)
    }

    /// Loaded projects, by directory name
    #[inline]
    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Mutable loaded projects
    #[inline]
    pub fn projects_mut(&mut self) -> &mut [Project] {
        &mut self.projects
    }

    /// Library folder
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Configuration applied to every project
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ScriptoriumConfig {
        &self.config
    }

    /// Number of loaded projects
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Whether no project is loaded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
