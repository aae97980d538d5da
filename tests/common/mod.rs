//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;

use git2::{Oid, Repository, Signature};
use scrivener::{ChangeSet, ChangedFile, FileStatus, UserPreferences};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write a file in the working tree, creating parent directories.
    pub fn write(&self, path: &str, content: &str) {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(full, content).expect("Failed to write file");
    }

    /// Delete a file from the working tree.
    pub fn remove(&self, path: &str) {
        std::fs::remove_file(self.dir.path().join(path)).expect("Failed to remove file");
    }

    /// Add a working-tree file to the index.
    pub fn stage(&self, path: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(path)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Record a deleted file in the index.
    pub fn stage_removal(&self, path: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.remove_path(Path::new(path)).expect("Failed to remove path");
        index.write().expect("Failed to write index");
    }

    /// Commit the current index. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let sig = self.signature();
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        // Get parent commit if exists
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Write, stage and commit a set of files in one go.
    pub fn commit_files(&self, files: &[(&str, &str)], message: &str) -> Oid {
        for (path, content) in files {
            self.write(path, content);
            self.stage(path);
        }
        self.commit(message)
    }
}

/// Numbered lines, each ending in a newline.
pub fn lines(count: usize, prefix: &str) -> String {
    (0..count).map(|i| format!("{prefix} {i}\n")).collect()
}

/// A file added with `additions` lines and no diff text.
pub fn added(path: &str, additions: usize) -> ChangedFile {
    ChangedFile::new(path, FileStatus::Added, additions, 0)
}

/// A modified file without diff text.
pub fn modified(path: &str, additions: usize, deletions: usize) -> ChangedFile {
    ChangedFile::new(path, FileStatus::Modified, additions, deletions)
}

/// A deleted file with `deletions` lines.
pub fn deleted(path: &str, deletions: usize) -> ChangedFile {
    ChangedFile::new(path, FileStatus::Deleted, 0, deletions)
}

/// Build a change set from files.
pub fn change_set(files: Vec<ChangedFile>) -> ChangeSet {
    ChangeSet::new(files)
}

/// Default preferences with a different subject limit.
pub fn prefs_with_max(max_subject_length: usize) -> UserPreferences {
    UserPreferences {
        max_subject_length,
        ..Default::default()
    }
}
