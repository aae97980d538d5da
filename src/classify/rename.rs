//! Project-wide rename detection.
//!
//! Kept behind [`RenameRule`] so hosts can swap the generic substitution
//! detector for a fixed literal pair, or disable detection entirely.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::content::split_diff_lines;
use crate::classify::select::argmax_by;
use crate::diff::model::ChangeSet;

/// Minimum length of either side of a substitution.
const MIN_LITERAL_LEN: usize = 3;

/// Minimum number of files carrying the same substitution.
const MIN_RENAME_FILES: usize = 2;

/// A detected `old → new` rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameDetection {
    pub old: String,
    pub new: String,
    /// Paths whose diff carries the substitution.
    pub files: Vec<String>,
}

/// An explicit before/after pair, e.g. a product's old and new display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameLiterals {
    pub old: String,
    pub new: String,
}

/// A rule that recognizes a change set as a rename.
pub trait RenameRule: Send + Sync + fmt::Debug {
    fn detect(&self, changes: &ChangeSet) -> Option<RenameDetection>;
}

/// Never detects a rename.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRename;

impl RenameRule for NoRename {
    fn detect(&self, _changes: &ChangeSet) -> Option<RenameDetection> {
        None
    }
}

/// Fires when some removed line contains `old` and some added line contains `new`.
#[derive(Debug, Clone)]
pub struct LiteralPairRule {
    pub literals: RenameLiterals,
}

impl LiteralPairRule {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            literals: RenameLiterals {
                old: old.into(),
                new: new.into(),
            },
        }
    }
}

impl RenameRule for LiteralPairRule {
    fn detect(&self, changes: &ChangeSet) -> Option<RenameDetection> {
        let RenameLiterals { old, new } = &self.literals;
        if old.is_empty() || new.is_empty() {
            return None;
        }

        let mut saw_old = false;
        let mut saw_new = false;
        let mut files = Vec::new();
        for file in &changes.files {
            let lines = split_diff_lines(&file.diff_text);
            let has_old = lines.removed.iter().any(|l| l.contains(old.as_str()));
            let has_new = lines.added.iter().any(|l| l.contains(new.as_str()));
            if has_old || has_new {
                files.push(file.path.clone());
            }
            saw_old |= has_old;
            saw_new |= has_new;
        }

        (saw_old && saw_new).then(|| RenameDetection {
            old: old.clone(),
            new: new.clone(),
            files,
        })
    }
}

/// Detects the same literal substitution applied across several files.
///
/// A file votes for `old → new` when its removed and added lines pair up
/// one-to-one and every pair differs only by that substitution. The pair
/// must be voted by at least two files and by at least half of the change set.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstitutionRule;

impl RenameRule for SubstitutionRule {
    fn detect(&self, changes: &ChangeSet) -> Option<RenameDetection> {
        let mut votes: Vec<((String, String), Vec<String>)> = Vec::new();

        for file in &changes.files {
            let Some(pair) = file_substitution(&file.diff_text) else {
                continue;
            };
            match votes.iter_mut().find(|(p, _)| *p == pair) {
                Some((_, files)) => files.push(file.path.clone()),
                None => votes.push((pair, vec![file.path.clone()])),
            }
        }

        let ((old, new), files) = argmax_by(votes, |(_, files)| files.len() as f64)?;
        let enough = files.len() >= MIN_RENAME_FILES && files.len() * 2 >= changes.files.len();
        if !enough {
            return None;
        }

        debug!(%old, %new, files = files.len(), "Detected project-wide rename");
        Some(RenameDetection { old, new, files })
    }
}

/// The single substitution a file's diff applies, if that is all it does.
fn file_substitution(diff_text: &str) -> Option<(String, String)> {
    let lines = split_diff_lines(diff_text);
    if lines.removed.is_empty() || lines.removed.len() != lines.added.len() {
        return None;
    }

    let mut found: Option<(String, String)> = None;
    for (removed, added) in lines.removed.iter().zip(&lines.added) {
        let pair = line_substitution(removed, added)?;
        match &found {
            Some(existing) if *existing != pair => return None,
            Some(_) => {}
            None => found = Some(pair),
        }
    }
    found
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// The differing middle of two lines, widened to whole words.
fn line_substitution(before: &str, after: &str) -> Option<(String, String)> {
    let a: Vec<char> = before.chars().collect();
    let b: Vec<char> = after.chars().collect();

    let max_common = a.len().min(b.len());
    let mut prefix = 0;
    while prefix < max_common && a[prefix] == b[prefix] {
        prefix += 1;
    }
    let mut suffix = 0;
    while suffix < max_common - prefix && a[a.len() - 1 - suffix] == b[b.len() - 1 - suffix] {
        suffix += 1;
    }

    while prefix > 0 && is_word_char(a[prefix - 1]) {
        prefix -= 1;
    }
    while suffix > 0 && is_word_char(a[a.len() - suffix]) {
        suffix -= 1;
    }

    let old: String = a[prefix..a.len() - suffix].iter().collect();
    let new: String = b[prefix..b.len() - suffix].iter().collect();
    let (old, new) = (old.trim().to_string(), new.trim().to_string());

    let plausible = |s: &str| {
        s.chars().count() >= MIN_LITERAL_LEN
            && s.chars().any(|c| c.is_alphabetic())
            && s.chars().all(is_word_char)
    };
    (old != new && plausible(&old) && plausible(&new)).then_some((old, new))
}
