//! Git-backed version history
//!
//! Every project directory is a Git repository. Structural changes commit
//! the descriptor together with any content files they created or removed;
//! scene edits commit only the scene file.

use crate::error::HistoryError;
use chrono::{DateTime, FixedOffset};
use git2::{Commit, ErrorCode, Repository, Signature, Sort, Status};
use std::path::{Path, PathBuf};

/// Display format of commit dates
pub const DATETIME_FORMAT: &str = "%A %d %B %Y, %H:%M:%S";

/// One commit, ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEntry {
    /// Hex commit id
    pub id: String,
    /// Seconds since the epoch
    pub timestamp: i64,
    /// Commit time formatted with [`DATETIME_FORMAT`]
    pub datetime: String,
    /// First line of the commit message
    pub message: String,
}

impl CommitEntry {
    fn from_commit(commit: &Commit<'_>) -> Self {
        let time = commit.time();
        let datetime = FixedOffset::east_opt(time.offset_minutes() * 60)
            .zip(DateTime::from_timestamp(time.seconds(), 0))
            .map(|(offset, utc)| utc.with_timezone(&offset).format(DATETIME_FORMAT).to_string())
            .unwrap_or_default();
        Self {
            id: commit.id().to_string(),
            timestamp: time.seconds(),
            datetime,
            message: commit.summary().unwrap_or_default().to_string(),
        }
    }
}

/// Repository rooted at a project directory
pub struct History {
    repo: Repository,
    root: PathBuf,
    author_name: String,
    author_email: String,
}

impl std::fmt::Debug for History {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("root", &self.root)
            .field("author_name", &self.author_name)
            .finish_non_exhaustive()
    }
}

impl History {
    /// Create a repository in `root`
    ///
    /// # Errors
    /// [`HistoryError::Git`] if the repository cannot be created
    pub fn init(root: &Path, author_name: &str, author_email: &str) -> Result<Self, HistoryError> {
        let repo = Repository::init(root)?;
        tracing::debug!("Initialized repository in {}", root.display());
        Ok(Self::wrap(repo, root, author_name, author_email))
    }

    /// Open the repository in `root`
    ///
    /// # Errors
    /// [`HistoryError::Git`] if `root` is not a repository
    pub fn open(root: &Path, author_name: &str, author_email: &str) -> Result<Self, HistoryError> {
        let repo = Repository::open(root)?;
        Ok(Self::wrap(repo, root, author_name, author_email))
    }

    fn wrap(repo: Repository, root: &Path, author_name: &str, author_email: &str) -> Self {
        Self {
            repo,
            root: root.to_path_buf(),
            author_name: author_name.to_string(),
            author_email: author_email.to_string(),
        }
    }

    fn relative<'a>(&self, path: &'a Path) -> Result<&'a Path, HistoryError> {
        path.strip_prefix(&self.root)
            .map_err(|_| HistoryError::OutsideRepository(path.to_path_buf()))
    }

    /// Stage the current content of `path`
    ///
    /// # Errors
    /// Git failures, or a path outside the project
    pub fn stage(&self, path: &Path) -> Result<(), HistoryError> {
        let relative = self.relative(path)?;
        let mut index = self.repo.index()?;
        index.add_path(relative)?;
        index.write()?;
        Ok(())
    }

    /// Stage the removal of `path`; untracked paths are ignored
    ///
    /// # Errors
    /// Git failures, or a path outside the project
    pub fn stage_removal(&self, path: &Path) -> Result<(), HistoryError> {
        let relative = self.relative(path)?;
        let mut index = self.repo.index()?;
        if index.get_path(relative, 0).is_some() {
            index.remove_path(relative)?;
            index.write()?;
        }
        Ok(())
    }

    /// Whether `path` differs from its committed version
    ///
    /// # Errors
    /// Git failures, or a path outside the project
    pub fn is_modified(&self, path: &Path) -> Result<bool, HistoryError> {
        let relative = self.relative(path)?;
        let status = self.repo.status_file(relative)?;
        Ok(status.intersects(
            Status::WT_NEW
                | Status::WT_MODIFIED
                | Status::WT_DELETED
                | Status::INDEX_NEW
                | Status::INDEX_MODIFIED
                | Status::INDEX_DELETED,
        ))
    }

    /// Commit the staged tree on top of `HEAD`
    ///
    /// # Errors
    /// [`HistoryError::Git`] on any libgit2 failure
    pub fn commit(&self, message: &str) -> Result<String, HistoryError> {
        let mut index = self.repo.index()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = Signature::now(&self.author_name, &self.author_email)?;
        let parent = self.head_commit()?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
        tracing::debug!("Committed {oid}: {message}");
        Ok(oid.to_string())
    }

    fn head_commit(&self) -> Result<Option<Commit<'_>>, HistoryError> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Every commit, newest first
    ///
    /// # Errors
    /// [`HistoryError::Git`] on any libgit2 failure
    pub fn entries(&self) -> Result<Vec<CommitEntry>, HistoryError> {
        self.walk(|_| Ok(true))
    }

    /// Commits that changed `path`, newest first
    ///
    /// # Errors
    /// Git failures, or a path outside the project
    pub fn entries_for(&self, path: &Path) -> Result<Vec<CommitEntry>, HistoryError> {
        let relative = self.relative(path)?.to_path_buf();
        self.walk(|commit| {
            let current = commit.tree()?.get_path(&relative).ok().map(|e| e.id());
            let previous = match commit.parent(0) {
                Ok(parent) => parent.tree()?.get_path(&relative).ok().map(|e| e.id()),
                Err(_) => None,
            };
            Ok(current != previous)
        })
    }

    fn walk<F>(&self, mut keep: F) -> Result<Vec<CommitEntry>, HistoryError>
    where
        F: FnMut(&Commit<'_>) -> Result<bool, git2::Error>,
    {
        if self.head_commit()?.is_none() {
            return Ok(Vec::new());
        }
        let mut walk = self.repo.revwalk()?;
        walk.set_sorting(Sort::TOPOLOGICAL)?;
        walk.push_head()?;

        let mut entries = Vec::new();
        for oid in walk {
            let commit = self.repo.find_commit(oid?)?;
            if keep(&commit)? {
                entries.push(CommitEntry::from_commit(&commit));
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn repo() -> (TempDir, History) {
        let dir = TempDir::new().unwrap();
        let history = History::init(dir.path(), "Tester", "tester@example.com").unwrap();
        (dir, history)
    }

    #[test]
    fn empty_repository_has_no_entries() {
        let (_dir, history) = repo();
        assert!(history.entries().unwrap().is_empty());
    }

    #[test]
    fn commits_are_listed_newest_first() {
        let (dir, history) = repo();
        let file = dir.path().join("a.txt");
        fs::write(&file, "one").unwrap();
        history.stage(&file).unwrap();
        history.commit("first").unwrap();
        fs::write(&file, "two!").unwrap();
        history.stage(&file).unwrap();
        history.commit("second").unwrap();

        let messages: Vec<_> = history.entries().unwrap().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["second", "first"]);
    }

    #[test]
    fn path_history_skips_unrelated_commits() {
        let (dir, history) = repo();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "a").unwrap();
        history.stage(&a).unwrap();
        history.commit("add a").unwrap();
        fs::write(&b, "b").unwrap();
        history.stage(&b).unwrap();
        history.commit("add b").unwrap();

        let for_a: Vec<_> = history.entries_for(&a).unwrap().into_iter().map(|e| e.message).collect();
        assert_eq!(for_a, vec!["add a"]);
    }

    #[test]
    fn modification_is_detected() {
        let (dir, history) = repo();
        let file = dir.path().join("a.txt");
        fs::write(&file, "a").unwrap();
        assert!(history.is_modified(&file).unwrap());
        history.stage(&file).unwrap();
        history.commit("add").unwrap();
        assert!(!history.is_modified(&file).unwrap());
        fs::write(&file, "changed").unwrap();
        assert!(history.is_modified(&file).unwrap());
    }

    #[test]
    fn removal_of_untracked_path_is_ignored() {
        let (dir, history) = repo();
        history.stage_removal(&dir.path().join("ghost.txt")).unwrap();
    }

    #[test]
    fn paths_outside_are_rejected() {
        let (_dir, history) = repo();
        let err = history.stage(Path::new("/elsewhere/file")).unwrap_err();
        assert!(matches!(err, HistoryError::OutsideRepository(_)));
    }

    #[test]
    fn datetime_uses_display_format() {
        let (dir, history) = repo();
        let file = dir.path().join("a.txt");
        fs::write(&file, "a").unwrap();
        history.stage(&file).unwrap();
        history.commit("add").unwrap();
        let entry = &history.entries().unwrap()[0];
        // e.g. "Sunday 18 October 2026, 10:04:05"
        assert!(entry.datetime.contains(", "));
        assert_eq!(entry.datetime.matches(':').count(), 2);
    }
}
