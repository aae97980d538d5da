//! Coarse size band for a change set.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Minor,
    Moderate,
    Major,
}

impl ImpactLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactLevel::Minor => "minor",
            ImpactLevel::Moderate => "moderate",
            ImpactLevel::Major => "major",
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total changed lines at which a change set is major regardless of file count.
const MAJOR_CHANGES: usize = 200;

/// Band a change set by file count and changed lines.
///
/// A change set of exactly 200 changed lines is already major.
pub fn assess(additions: usize, deletions: usize, file_count: usize) -> ImpactLevel {
    let changes = additions + deletions;
    if file_count > 10 || changes >= MAJOR_CHANGES {
        ImpactLevel::Major
    } else if file_count > 3 || changes > 50 {
        ImpactLevel::Moderate
    } else {
        ImpactLevel::Minor
    }
}
