//! Deterministic change classification.
//!
//! Every decision here is a pure function of the change set and a handful of
//! static rule tables, so the same input always yields the same analysis.

pub mod analysis;
pub mod commit_type;
pub mod content;
pub mod describe;
pub mod impact;
pub mod patterns;
pub mod rename;
pub mod scope;
pub mod select;

pub use analysis::{ChangeAnalysis, Classifier};
pub use commit_type::{CommitType, TypeScores, infer_type, score_types};
pub use content::{ChangeKind, ContentAnalysis, analyze_diff};
pub use impact::{ImpactLevel, assess};
pub use patterns::{FileCategory, categorize, categorize_or_default};
pub use rename::{LiteralPairRule, NoRename, RenameDetection, RenameLiterals, RenameRule, SubstitutionRule};
pub use scope::detect_scope;
