//! Commit type enum and weighted type inference.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::patterns::{self, DEFAULT_WEIGHT};
use crate::classify::select::argmax_by;
use crate::diff::model::ChangedFile;

/// Commit types the classifier can produce.
///
/// Declaration order is the tie-break order: `Feat` wins equal scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Test,
    Chore,
}

impl CommitType {
    pub const ALL: [CommitType; 7] = [
        CommitType::Feat,
        CommitType::Fix,
        CommitType::Docs,
        CommitType::Style,
        CommitType::Refactor,
        CommitType::Test,
        CommitType::Chore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Docs => "docs",
            CommitType::Style => "style",
            CommitType::Refactor => "refactor",
            CommitType::Test => "test",
            CommitType::Chore => "chore",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CommitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feat" => Ok(Self::Feat),
            "fix" => Ok(Self::Fix),
            "docs" => Ok(Self::Docs),
            "style" => Ok(Self::Style),
            "refactor" => Ok(Self::Refactor),
            "test" => Ok(Self::Test),
            "chore" => Ok(Self::Chore),
            _ => Err(format!("Unknown commit type: {}", s)),
        }
    }
}

/// Multiplier for pure additions voting `feat`.
const PURE_ADDITION_BOOST: f64 = 1.5;
/// Multiplier for deletion-heavy files voting `refactor` or `fix`.
const DELETION_HEAVY_BOOST: f64 = 1.3;
/// Bonus for a change set that only deletes.
const ALL_DELETIONS_BONUS: f64 = 10.0;
/// Bonus when some file deletes more than twice what it adds.
const HEAVY_DELETION_BONUS: f64 = 15.0;
/// Bonus when some file is a large rewrite.
const REWRITE_BONUS: f64 = 12.0;

/// Final score per commit type, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TypeScores {
    scores: [f64; 7],
}

impl TypeScores {
    pub fn get(&self, ty: CommitType) -> f64 {
        self.scores[ty.index()]
    }

    fn add(&mut self, ty: CommitType, amount: f64) {
        self.scores[ty.index()] += amount;
    }

    pub fn iter(&self) -> impl Iterator<Item = (CommitType, f64)> + '_ {
        CommitType::ALL.iter().map(|ty| (*ty, self.get(*ty)))
    }

    /// Highest scoring type, `feat` first on ties.
    pub fn best(&self) -> CommitType {
        argmax_by(CommitType::ALL, |ty| self.get(*ty)).unwrap_or(CommitType::Feat)
    }

    /// Highest scoring type whose name is in `allowed`.
    ///
    /// Returns `None` when none of the classifier's types are allowed.
    pub fn best_allowed(&self, allowed: &[String]) -> Option<CommitType> {
        let permitted = CommitType::ALL
            .into_iter()
            .filter(|ty| allowed.iter().any(|a| a.eq_ignore_ascii_case(ty.as_str())));
        argmax_by(permitted, |ty| self.get(*ty))
    }

    /// Types sharing the maximum score, in declaration order.
    pub fn tied_leaders(&self) -> Vec<CommitType> {
        let top = self.get(self.best());
        CommitType::ALL
            .into_iter()
            .filter(|ty| self.get(*ty) == top)
            .collect()
    }
}

/// Score every commit type for a set of files.
pub fn score_types(files: &[ChangedFile]) -> TypeScores {
    let mut scores = TypeScores::default();

    for file in files {
        match patterns::categorize(&file.path) {
            Some(category) => {
                let mut score = category.weight;
                if file.is_pure_addition() && category.commit_type == CommitType::Feat {
                    score *= PURE_ADDITION_BOOST;
                }
                if file.deletions > file.additions
                    && matches!(category.commit_type, CommitType::Refactor | CommitType::Fix)
                {
                    score *= DELETION_HEAVY_BOOST;
                }
                scores.add(category.commit_type, score);
            }
            None => scores.add(CommitType::Feat, DEFAULT_WEIGHT),
        }
    }

    let total_changes: usize = files.iter().map(|f| f.additions + f.deletions).sum();

    if !files.is_empty() && files.iter().all(|f| f.additions == 0) {
        scores.add(CommitType::Chore, ALL_DELETIONS_BONUS);
    } else if total_changes > 50 && files.iter().any(|f| f.deletions > f.additions * 2) {
        scores.add(CommitType::Refactor, HEAVY_DELETION_BONUS);
    } else if files.iter().any(|f| f.deletions > 50 && f.additions > 10) {
        scores.add(CommitType::Refactor, REWRITE_BONUS);
    }

    debug!(?scores, "Scored commit types");
    scores
}

/// Infer the commit type for a set of files.
pub fn infer_type(files: &[ChangedFile]) -> CommitType {
    score_types(files).best()
}
