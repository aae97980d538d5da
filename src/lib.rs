//! scrivener - infers conventional commit messages from a diff.
//!
//! # Overview
//!
//! scrivener classifies a set of changed files into a commit type, an optional
//! scope and a short description using static, weighted rule tables. An
//! optional AI provider may propose a subject instead; it is validated exactly
//! like a synthesized one and any failure falls back to the classifier.

pub mod ai;
pub mod classify;
pub mod config;
pub mod diff;
pub mod error;
pub mod generate;
pub mod message;

// Re-export commonly used types
pub use ai::{CommandProvider, CommitMessageProvider, TimeoutProvider};
pub use classify::{ChangeAnalysis, Classifier, CommitType, ImpactLevel};
pub use config::{CommitStyle, UserPreferences};
pub use diff::{ChangeSet, ChangedFile, FileStatus};
pub use error::{AiError, CollectError, ConfigError, GenerationError, ValidationError};
pub use generate::{Generation, Generator, MessageSource, Notice};
pub use message::{CommitMessage, ValidationWarning};
