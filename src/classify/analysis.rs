//! The change classifier: one [`ChangeAnalysis`] per change set.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::classify::commit_type::{CommitType, TypeScores, score_types};
use crate::classify::content::{ChangeKind, ContentAnalysis, analyze_diff};
use crate::classify::describe::{describe, describe_body};
use crate::classify::impact::{ImpactLevel, assess};
use crate::classify::patterns::categorize_or_default;
use crate::classify::rename::{RenameDetection, RenameRule, SubstitutionRule};
use crate::classify::scope::detect_scope;
use crate::diff::model::ChangeSet;

/// Everything the classifier concluded about a change set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeAnalysis {
    pub commit_type: CommitType,
    pub scope: Option<String>,
    pub description: String,
    pub impact: ImpactLevel,
    pub categories: BTreeSet<String>,
    pub content: ContentAnalysis,
    pub rename: Option<RenameDetection>,
    #[serde(skip)]
    pub scores: TypeScores,
    /// Suggested body listing per-file changes, when there are several files.
    pub body: Option<String>,
}

/// Commit type a dominant content kind argues for.
fn kind_hint(kind: ChangeKind) -> CommitType {
    match kind {
        ChangeKind::Test => CommitType::Test,
        ChangeKind::Config => CommitType::Chore,
        ChangeKind::Comment => CommitType::Docs,
        ChangeKind::Import => CommitType::Refactor,
        ChangeKind::Function | ChangeKind::Class | ChangeKind::Interface => CommitType::Feat,
    }
}

/// Deterministic classifier over static pattern tables.
#[derive(Debug)]
pub struct Classifier {
    rename_rule: Box<dyn RenameRule>,
    allowed_types: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Box::new(SubstitutionRule))
    }
}

impl Classifier {
    pub fn new(rename_rule: Box<dyn RenameRule>) -> Self {
        Self {
            rename_rule,
            allowed_types: CommitType::ALL.iter().map(|t| t.as_str().to_string()).collect(),
        }
    }

    /// Restrict the chosen type to these names when possible.
    pub fn with_allowed_types(mut self, allowed: Vec<String>) -> Self {
        self.allowed_types = allowed;
        self
    }

    fn choose_type(&self, scores: &TypeScores, dominant: Option<ChangeKind>) -> CommitType {
        let leaders = scores.tied_leaders();
        if leaders.len() > 1
            && let Some(hint) = dominant.map(kind_hint)
            && leaders.contains(&hint)
            && self.is_allowed(hint)
        {
            return hint;
        }
        scores.best_allowed(&self.allowed_types).unwrap_or_else(|| scores.best())
    }

    fn is_allowed(&self, ty: CommitType) -> bool {
        self.allowed_types.iter().any(|a| a.eq_ignore_ascii_case(ty.as_str()))
    }

    /// Classify a change set. Total over any input, including an empty set.
    pub fn classify(&self, changes: &ChangeSet) -> ChangeAnalysis {
        let files = &changes.files;

        let contents: Vec<ContentAnalysis> = files.iter().map(|f| analyze_diff(&f.diff_text)).collect();
        let mut content = ContentAnalysis::default();
        for c in &contents {
            content.merge(c.clone());
        }
        let all_added: String = files.iter().map(|f| f.diff_text.as_str()).collect::<Vec<_>>().join("\n");
        content.dominant_change_kind = analyze_diff(&all_added).dominant_change_kind;

        let categories: BTreeSet<String> = files
            .iter()
            .map(|f| categorize_or_default(&f.path).category.to_string())
            .collect();
        let impact = assess(changes.total_additions, changes.total_deletions, files.len());
        let scores = score_types(files);

        let rename = self.rename_rule.detect(changes);
        let (commit_type, scope, description) = match &rename {
            Some(detection) => {
                let docs_only = files.iter().all(|f| categorize_or_default(&f.path).is_docs());
                let ty = if docs_only { CommitType::Docs } else { CommitType::Chore };
                (ty, None, format!("rename {} to {}", detection.old, detection.new))
            }
            None => {
                let ty = self.choose_type(&scores, content.dominant_change_kind);
                let scope = detect_scope(files.iter().map(|f| f.path.as_str()));
                let description = describe(files, &contents, scope.as_deref());
                (ty, scope, description)
            }
        };

        debug!(
            %commit_type,
            ?scope,
            %impact,
            files = files.len(),
            "Classified change set"
        );

        ChangeAnalysis {
            commit_type,
            scope,
            description,
            impact,
            categories,
            content,
            rename,
            scores,
            body: describe_body(files),
        }
    }
}
