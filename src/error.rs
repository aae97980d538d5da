//! Error types for scrivener modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from collecting a change set out of a git repository.
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("Not a git repository: {0}")]
    NotARepository(#[source] git2::Error),

    #[error("No changes to describe (working tree is clean)")]
    NoChanges,

    #[error("Resolve merge conflicts before generating a message: {}", paths.join(", "))]
    ConflictsPresent { paths: Vec<String> },

    #[error("Failed to collect diff: {0}")]
    DiffFailed(#[source] git2::Error),
}

/// Errors from the AI provider boundary.
///
/// None of these are fatal: the orchestrator turns every one of them into a
/// fallback to deterministic classification.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("No AI command configured")]
    NotConfigured,

    #[error("AI command '{0}' not found on PATH")]
    NotInstalled(String),

    #[error("Failed to spawn AI command: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("AI command exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("AI command timed out after {0} seconds")]
    Timeout(u64),

    #[error("AI returned an empty response")]
    EmptyResponse,

    #[error("AI returned an unusable response: {0}")]
    InvalidResponse(String),
}

/// Why a subject line could not be coerced into conventional format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatProblem {
    /// The type is neither allowed nor a known alias of an allowed type.
    UnknownType(String),
    /// The subject lacks a `type(scope): ` prefix and none could be synthesized.
    MissingPrefix,
    /// Nothing is left after the prefix.
    EmptyDescription,
}

impl std::fmt::Display for FormatProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatProblem::UnknownType(ty) => write!(f, "commit type '{ty}' is not allowed"),
            FormatProblem::MissingPrefix => {
                write!(f, "expected 'type(scope): description'")
            }
            FormatProblem::EmptyDescription => write!(f, "description is empty"),
        }
    }
}

/// Fatal validation failures for a candidate subject line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Commit message cannot be empty")]
    EmptyMessage,

    #[error("Invalid commit format ({reason}): {subject}")]
    InvalidCommitFormat {
        subject: String,
        reason: FormatProblem,
    },
}

impl ValidationError {
    /// Stable code for hosts that display or match on failures.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::EmptyMessage => "EMPTY_MESSAGE",
            ValidationError::InvalidCommitFormat { .. } => "INVALID_COMMIT_FORMAT",
        }
    }
}

/// Errors that end a message generation attempt.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("No changed files to describe")]
    NoChanges,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors from loading user preferences.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_codes() {
        assert_eq!(ValidationError::EmptyMessage.code(), "EMPTY_MESSAGE");
        let err = ValidationError::InvalidCommitFormat {
            subject: "whatever".to_string(),
            reason: FormatProblem::MissingPrefix,
        };
        assert_eq!(err.code(), "INVALID_COMMIT_FORMAT");
    }

    #[test]
    fn test_invalid_format_message_names_reason() {
        let err = ValidationError::InvalidCommitFormat {
            subject: "wip: stuff".to_string(),
            reason: FormatProblem::UnknownType("wip".to_string()),
        };
        let text = err.to_string();
        assert!(text.contains("'wip' is not allowed"));
        assert!(text.contains("wip: stuff"));
    }

    #[test]
    fn test_conflicts_lists_paths() {
        let err = CollectError::ConflictsPresent {
            paths: vec!["a.rs".to_string(), "b.rs".to_string()],
        };
        assert!(err.to_string().contains("a.rs, b.rs"));
    }
}
