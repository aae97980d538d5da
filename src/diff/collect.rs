//! Change set collection from a git repository using git2.
//!
//! This is the host side of the input boundary: the classifier never touches
//! git, it only consumes the [`ChangeSet`] built here.

use std::collections::HashMap;
use std::path::Path;

use git2::{Delta, Diff, DiffFindOptions, DiffFormat, DiffOptions, ErrorCode, Repository, Tree};
use tracing::{debug, warn};

use crate::diff::model::{ChangeSet, ChangedFile, FileStatus};
use crate::error::CollectError;

/// Maximum characters of patch text kept per file.
const MAX_FILE_DIFF_LENGTH: usize = 20_000;

/// Which pending changes to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectMode {
    /// Index against HEAD only.
    Staged,
    /// Staged, unstaged and untracked changes against HEAD.
    #[default]
    WorkingTree,
}

/// Open the repository containing `path`.
pub fn open_repository(path: &Path) -> Result<Repository, CollectError> {
    Repository::discover(path).map_err(CollectError::NotARepository)
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found).
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, CollectError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(CollectError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(CollectError::DiffFailed)?;
    Ok(Some(tree))
}

/// Refuse to describe a repository that is mid-merge with conflicts.
fn ensure_no_conflicts(repo: &Repository) -> Result<(), CollectError> {
    let index = repo.index().map_err(CollectError::DiffFailed)?;
    if !index.has_conflicts() {
        return Ok(());
    }

    let mut paths = Vec::new();
    for conflict in index.conflicts().map_err(CollectError::DiffFailed)? {
        let conflict = conflict.map_err(CollectError::DiffFailed)?;
        let entry = conflict.our.or(conflict.their).or(conflict.ancestor);
        if let Some(entry) = entry {
            paths.push(String::from_utf8_lossy(&entry.path).to_string());
        }
    }
    paths.sort();
    paths.dedup();
    Err(CollectError::ConflictsPresent { paths })
}

/// Collect pending changes into a [`ChangeSet`].
pub fn collect_change_set(repo: &Repository, mode: CollectMode) -> Result<ChangeSet, CollectError> {
    ensure_no_conflicts(repo)?;
    let head_tree = resolve_head_tree(repo)?;

    let mut diff = match mode {
        CollectMode::Staged => repo.diff_tree_to_index(head_tree.as_ref(), None, None),
        CollectMode::WorkingTree => {
            let mut opts = DiffOptions::new();
            opts.include_untracked(true)
                .recurse_untracked_dirs(true)
                .show_untracked_content(true);
            repo.diff_tree_to_workdir_with_index(head_tree.as_ref(), Some(&mut opts))
        }
    }
    .map_err(CollectError::DiffFailed)?;
    diff.find_similar(Some(DiffFindOptions::new().renames(true)))
        .map_err(CollectError::DiffFailed)?;

    let mut files = FileAccumulator::default();
    files.absorb(&diff);

    let files = files.finish();
    if files.is_empty() {
        return Err(CollectError::NoChanges);
    }

    let set = ChangeSet::new(files);
    debug!("Collected change set: {}", set.summary);
    Ok(set)
}

/// Builds one entry per file from a single HEAD-relative diff.
#[derive(Default)]
struct FileAccumulator {
    files: Vec<ChangedFile>,
    index: HashMap<String, usize>,
}

impl FileAccumulator {
    fn absorb(&mut self, diff: &Diff<'_>) {
        for delta in diff.deltas() {
            let status = match delta.status() {
                Delta::Added | Delta::Untracked => FileStatus::Added,
                Delta::Deleted => FileStatus::Deleted,
                Delta::Renamed => FileStatus::Renamed,
                _ => FileStatus::Modified,
            };

            let new_path = delta.new_file().path().map(|p| p.to_string_lossy().to_string());
            let old_path = delta.old_file().path().map(|p| p.to_string_lossy().to_string());

            let (path, old_path) = match status {
                FileStatus::Renamed => (new_path.clone().or_else(|| old_path.clone()), old_path),
                _ => (new_path.or(old_path), None),
            };
            let Some(path) = path.filter(|p| !p.is_empty()) else {
                continue;
            };

            if !self.index.contains_key(&path) {
                let mut file = ChangedFile::new(path.clone(), status, 0, 0);
                file.old_path = old_path;
                self.index.insert(path, self.files.len());
                self.files.push(file);
            }
        }

        if let Err(e) = diff.print(DiffFormat::Patch, |delta, _hunk, line| {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().to_string());
            let Some(&idx) = path.as_ref().and_then(|p| self.index.get(p)) else {
                return true;
            };
            let file = &mut self.files[idx];

            let origin = line.origin();
            match origin {
                '+' => file.additions += 1,
                '-' => file.deletions += 1,
                _ => {}
            }

            let content = std::str::from_utf8(line.content()).unwrap_or("");
            if file.diff_text.len() + content.len() + 2 > MAX_FILE_DIFF_LENGTH {
                return true;
            }
            if origin == '+' || origin == '-' || origin == ' ' {
                file.diff_text.push(origin);
            }
            file.diff_text.push_str(content);

            true
        }) {
            warn!("Failed to collect diff text: {e}");
        }
    }

    fn finish(mut self) -> Vec<ChangedFile> {
        self.files.sort_by(|a, b| a.path.cmp(&b.path));
        self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_with_commit(dir: &Path, files: &[(&str, &str)]) -> Repository {
        let repo = Repository::init(dir).unwrap();
        {
            let mut index = repo.index().unwrap();
            for (name, content) in files {
                std::fs::write(dir.join(name), content).unwrap();
                index.add_path(Path::new(name)).unwrap();
            }
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let sig = git2::Signature::now("Test", "test@test.com").unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[]).unwrap();
        }
        repo
    }

    #[test]
    fn test_clean_repo_returns_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_with_commit(dir.path(), &[("a.txt", "a\n")]);
        let result = collect_change_set(&repo, CollectMode::WorkingTree);
        assert!(matches!(result, Err(CollectError::NoChanges)));
    }

    #[test]
    fn test_untracked_file_counts_lines() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_with_commit(dir.path(), &[("a.txt", "a\n")]);
        std::fs::write(dir.path().join("new.txt"), "one\ntwo\nthree\n").unwrap();

        let set = collect_change_set(&repo, CollectMode::WorkingTree).unwrap();
        let file = set.files.iter().find(|f| f.path == "new.txt").unwrap();
        assert_eq!(file.status, FileStatus::Added);
        assert_eq!(file.additions, 3);
        assert_eq!(file.deletions, 0);
        assert!(file.diff_text.contains("+two"));
    }

    #[test]
    fn test_staged_mode_ignores_workdir_edits() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_with_commit(dir.path(), &[("a.txt", "a\n"), ("b.txt", "b\n")]);

        std::fs::write(dir.path().join("a.txt"), "a\nmore\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("a.txt")).unwrap();
        index.write().unwrap();
        std::fs::write(dir.path().join("b.txt"), "changed\n").unwrap();

        let set = collect_change_set(&repo, CollectMode::Staged).unwrap();
        assert_eq!(set.paths(), vec!["a.txt"]);
        assert_eq!(set.total_additions, 1);
    }

    #[test]
    fn test_modification_counts_both_sides() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_with_commit(dir.path(), &[("file.txt", "original\n")]);
        std::fs::write(dir.path().join("file.txt"), "modified\n").unwrap();

        let set = collect_change_set(&repo, CollectMode::WorkingTree).unwrap();
        let file = &set.files[0];
        assert_eq!(file.status, FileStatus::Modified);
        assert_eq!((file.additions, file.deletions), (1, 1));
        assert!(file.diff_text.contains("-original"));
        assert!(file.diff_text.contains("+modified"));
    }

    #[test]
    fn test_empty_repo_has_no_head_tree() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("new.txt"), "hello\n").unwrap();

        let set = collect_change_set(&repo, CollectMode::WorkingTree).unwrap();
        assert!(set.files.iter().any(|f| f.path == "new.txt"));
    }

    #[test]
    fn test_open_repository_outside_git_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = open_repository(dir.path());
        assert!(matches!(result, Err(CollectError::NotARepository(_))));
    }
}
