//! Change set data shapes shared by the classifier and the hosts.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Status of a changed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Added => write!(f, "Added"),
            FileStatus::Modified => write!(f, "Modified"),
            FileStatus::Deleted => write!(f, "Deleted"),
            FileStatus::Renamed => write!(f, "Renamed"),
        }
    }
}

/// A single file-level change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub path: String,
    pub status: FileStatus,
    #[serde(default)]
    pub additions: usize,
    #[serde(default)]
    pub deletions: usize,
    /// Unified diff text for this file only.
    #[serde(default)]
    pub diff_text: String,
    /// Old path for renamed files (None for non-rename changes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
}

impl ChangedFile {
    pub fn new(path: impl Into<String>, status: FileStatus, additions: usize, deletions: usize) -> Self {
        Self {
            path: path.into(),
            status,
            additions,
            deletions,
            diff_text: String::new(),
            old_path: None,
        }
    }

    pub fn with_diff(mut self, diff_text: impl Into<String>) -> Self {
        self.diff_text = diff_text.into();
        self
    }

    pub fn with_old_path(mut self, old_path: impl Into<String>) -> Self {
        self.old_path = Some(old_path.into());
        self
    }

    /// Lines were only added (a net-new file or an append-only edit).
    pub fn is_pure_addition(&self) -> bool {
        self.additions > 0 && self.deletions == 0
    }

    /// The path with `\` separators normalized to `/`.
    pub fn normalized_path(&self) -> String {
        self.path.replace('\\', "/")
    }
}

/// The set of changes a message is generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub files: Vec<ChangedFile>,
    pub total_additions: usize,
    pub total_deletions: usize,
    pub summary: String,
}

impl ChangeSet {
    /// Build a change set, deriving totals and the summary line from the files.
    pub fn new(files: Vec<ChangedFile>) -> Self {
        let total_additions = files.iter().map(|f| f.additions).sum();
        let total_deletions = files.iter().map(|f| f.deletions).sum();
        let summary = summary_line(files.len(), total_additions, total_deletions);
        Self {
            files,
            total_additions,
            total_deletions,
            summary,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_changes(&self) -> usize {
        self.total_additions + self.total_deletions
    }

    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }
}

/// Wire shape accepted from hosts: totals and summary are optional.
#[derive(Deserialize)]
struct RawChangeSet {
    files: Vec<ChangedFile>,
    #[serde(default)]
    summary: Option<String>,
}

impl<'de> Deserialize<'de> for ChangeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawChangeSet::deserialize(deserializer)?;
        let mut set = ChangeSet::new(raw.files);
        if let Some(summary) = raw.summary.filter(|s| !s.trim().is_empty()) {
            set.summary = summary;
        }
        Ok(set)
    }
}

/// Git-style one-line stat summary.
fn summary_line(files: usize, additions: usize, deletions: usize) -> String {
    let plural = |n: usize, one: &str, many: &str| {
        if n == 1 { format!("{n} {one}") } else { format!("{n} {many}") }
    };
    format!(
        "{} changed, {}(+), {}(-)",
        plural(files, "file", "files"),
        plural(additions, "insertion", "insertions"),
        plural(deletions, "deletion", "deletions"),
    )
}
