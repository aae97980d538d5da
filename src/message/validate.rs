//! Subject validation and repair.
//!
//! Rules run in order: emptiness, type, conventional shape, then length.
//! Type and shape problems are repaired when a remap or a known prefix makes
//! that possible; length problems are always repaired by truncation.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{CommitStyle, UserPreferences};
use crate::error::{FormatProblem, ValidationError};
use crate::message::format::{CommitMessage, conventional_subject};

/// Word-boundary cuts must land at least this far into the allowed length.
const WORD_BOUNDARY_RATIO: f64 = 0.7;

const ELLIPSIS: &str = "...";

/// `type(scope)!: description`
static CONVENTIONAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)(?:\(([^)]*)\))?(!)?\s*:\s*(.*)$").expect("conventional subject pattern must compile")
});

/// Aliases accepted in place of a canonical type.
const TYPE_REMAPS: &[(&str, &str)] = &[
    ("feature", "feat"),
    ("features", "feat"),
    ("feat", "feat"),
    ("bugfix", "fix"),
    ("bug", "fix"),
    ("hotfix", "fix"),
    ("fixes", "fix"),
    ("fixed", "fix"),
    ("documentation", "docs"),
    ("doc", "docs"),
    ("document", "docs"),
    ("styles", "style"),
    ("styling", "style"),
    ("format", "style"),
    ("formatting", "style"),
    ("refactoring", "refactor"),
    ("refactored", "refactor"),
    ("restructure", "refactor"),
    ("tests", "test"),
    ("testing", "test"),
    ("chores", "chore"),
    ("maintenance", "chore"),
    ("deps", "chore"),
    ("dependencies", "chore"),
    ("performance", "perf"),
    ("optimize", "perf"),
    ("builds", "build"),
    ("revert", "revert"),
    ("reverts", "revert"),
];

/// A repair applied while validating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    TypeRemapped { from: String, to: String },
    PrefixSynthesized { prefix: String },
    MessageTooLong { length: usize, max: usize },
}

impl ValidationWarning {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationWarning::TypeRemapped { .. } => "TYPE_REMAPPED",
            ValidationWarning::PrefixSynthesized { .. } => "PREFIX_SYNTHESIZED",
            ValidationWarning::MessageTooLong { .. } => "MESSAGE_TOO_LONG",
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::TypeRemapped { from, to } => write!(f, "commit type '{from}' changed to '{to}'"),
            ValidationWarning::PrefixSynthesized { prefix } => write!(f, "added missing prefix '{prefix}'"),
            ValidationWarning::MessageTooLong { length, max } => {
                write!(f, "subject was {length} characters, truncated to {max}")
            }
        }
    }
}

/// A message that passed validation, with the repairs made to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validated {
    pub message: CommitMessage,
    pub warnings: Vec<ValidationWarning>,
}

/// Parsed parts of a conventional subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalSubject {
    pub commit_type: String,
    pub scope: Option<String>,
    pub breaking: bool,
    pub description: String,
}

/// Parse a `type(scope)!: description` subject line.
pub fn parse_subject(subject: &str) -> Option<ConventionalSubject> {
    let first_line = subject.lines().next().unwrap_or("");
    let caps = CONVENTIONAL_PATTERN.captures(first_line)?;
    Some(ConventionalSubject {
        commit_type: caps.get(1).map(|m| m.as_str().to_string())?,
        scope: caps
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty()),
        breaking: caps.get(3).is_some(),
        description: caps.get(4).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
    })
}

/// Map `raw` onto an allowed type, either directly or through the alias table.
pub fn resolve_type(raw: &str, prefs: &UserPreferences) -> Option<String> {
    let lower = raw.to_lowercase();
    if prefs.allows(&lower) {
        return Some(lower);
    }
    TYPE_REMAPS
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, target)| target.to_string())
        .filter(|target| prefs.allows(target))
}

/// Shorten `subject` to at most `max` characters, ending in `...`.
///
/// Cuts at the last whitespace before `max - 3` when that whitespace sits at
/// least 70% of the way into `max`; otherwise cuts hard at `max - 3`.
pub fn truncate_subject(subject: &str, max: usize) -> String {
    let chars: Vec<char> = subject.chars().collect();
    if chars.len() <= max {
        return subject.to_string();
    }

    let limit = max.saturating_sub(ELLIPSIS.len());
    let head = &chars[..limit];
    let min_boundary = (max as f64 * WORD_BOUNDARY_RATIO).ceil() as usize;
    let cut = match head.iter().rposition(|c| c.is_whitespace()) {
        Some(boundary) if boundary >= min_boundary => boundary,
        _ => limit,
    };

    let mut truncated: String = chars[..cut].iter().collect();
    truncated.truncate(truncated.trim_end().len());
    truncated.push_str(ELLIPSIS);
    truncated
}

fn invalid(subject: &str, reason: FormatProblem) -> ValidationError {
    ValidationError::InvalidCommitFormat {
        subject: subject.to_string(),
        reason,
    }
}

/// Check and repair a conventional subject in place.
fn validate_conventional(
    message: &mut CommitMessage,
    prefs: &UserPreferences,
    warnings: &mut Vec<ValidationWarning>,
) -> Result<(), ValidationError> {
    let subject = message.subject.trim().to_string();

    let parsed = match parse_subject(&subject) {
        Some(parsed) => parsed,
        None => {
            // Rule 3: synthesize the prefix from the known type and scope.
            if subject.contains(':') {
                return Err(invalid(&subject, FormatProblem::MissingPrefix));
            }
            let known = message.commit_type.trim();
            if known.is_empty() {
                return Err(invalid(&subject, FormatProblem::MissingPrefix));
            }
            let prefix = conventional_subject(known, message.scope.as_deref(), "");
            warnings.push(ValidationWarning::PrefixSynthesized {
                prefix: prefix.trim_end().to_string(),
            });
            ConventionalSubject {
                commit_type: known.to_string(),
                scope: message.scope.clone(),
                breaking: false,
                description: subject.clone(),
            }
        }
    };

    let commit_type = resolve_type(&parsed.commit_type, prefs)
        .ok_or_else(|| invalid(&subject, FormatProblem::UnknownType(parsed.commit_type.clone())))?;
    if commit_type != parsed.commit_type {
        warnings.push(ValidationWarning::TypeRemapped {
            from: parsed.commit_type.clone(),
            to: commit_type.clone(),
        });
    }

    if parsed.description.is_empty() {
        return Err(invalid(&subject, FormatProblem::EmptyDescription));
    }

    let bang = if parsed.breaking { "!" } else { "" };
    message.subject = match parsed.scope.as_deref() {
        Some(scope) => format!("{commit_type}({scope}){bang}: {}", parsed.description),
        None => format!("{commit_type}{bang}: {}", parsed.description),
    };
    message.commit_type = commit_type;
    message.scope = parsed.scope;
    Ok(())
}

/// Validate a message against the preferences, repairing what can be repaired.
pub fn validate(mut message: CommitMessage, prefs: &UserPreferences) -> Result<Validated, ValidationError> {
    let mut warnings = Vec::new();

    if message.subject.trim().is_empty() {
        return Err(ValidationError::EmptyMessage);
    }

    match prefs.style {
        CommitStyle::Conventional => {
            validate_conventional(&mut message, prefs, &mut warnings)?;
            message.is_conventional = true;
        }
        CommitStyle::Custom => {
            message.subject = message.subject.trim().to_string();
            message.is_conventional = false;
        }
    }

    // Length is checked last so it sees any prefix added above.
    let max = prefs.max_subject_length;
    let length = message.subject.chars().count();
    if length > max {
        warn!(length, max, "Subject too long, truncating");
        message.subject = truncate_subject(&message.subject, max);
        warnings.push(ValidationWarning::MessageTooLong { length, max });
    }

    debug!(subject = %message.subject, warnings = warnings.len(), "Validated message");
    Ok(Validated { message, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(subject: &str) -> CommitMessage {
        CommitMessage {
            subject: subject.to_string(),
            commit_type: "feat".to_string(),
            scope: Some("api".to_string()),
            body: None,
            is_conventional: true,
        }
    }

    fn prefs() -> UserPreferences {
        UserPreferences::default()
    }

    #[test]
    fn test_parse_feat_subject() {
        let parsed = parse_subject("feat: add new feature").unwrap();
        assert_eq!(parsed.commit_type, "feat");
        assert_eq!(parsed.scope, None);
        assert!(!parsed.breaking);
        assert_eq!(parsed.description, "add new feature");
    }

    #[test]
    fn test_parse_breaking_with_scope_and_exclamation() {
        let parsed = parse_subject("feat(api)!: breaking api change").unwrap();
        assert_eq!(parsed.scope.as_deref(), Some("api"));
        assert!(parsed.breaking);
    }

    #[test]
    fn test_parse_non_conventional() {
        assert!(parse_subject("just a normal commit message").is_none());
        assert!(parse_subject("my change: stuff").is_none());
    }

    #[test]
    fn test_valid_subject_passes_untouched() {
        let validated = validate(candidate("fix(auth): handle expired tokens"), &prefs()).unwrap();
        assert_eq!(validated.message.subject, "fix(auth): handle expired tokens");
        assert_eq!(validated.message.commit_type, "fix");
        assert_eq!(validated.message.scope.as_deref(), Some("auth"));
        assert!(validated.warnings.is_empty());
    }

    #[test]
    fn test_empty_subject_fails() {
        let err = validate(candidate("   "), &prefs()).unwrap_err();
        assert_eq!(err, ValidationError::EmptyMessage);
        assert_eq!(err.code(), "EMPTY_MESSAGE");
    }

    #[test]
    fn test_alias_type_is_remapped() {
        let validated = validate(candidate("feature: add dark mode"), &prefs()).unwrap();
        assert_eq!(validated.message.subject, "feat: add dark mode");
        assert_eq!(
            validated.warnings,
            vec![ValidationWarning::TypeRemapped {
                from: "feature".to_string(),
                to: "feat".to_string()
            }]
        );
    }

    #[test]
    fn test_capitalized_type_is_lowercased() {
        let validated = validate(candidate("Fix(ui): align buttons"), &prefs()).unwrap();
        assert_eq!(validated.message.subject, "fix(ui): align buttons");
        assert_eq!(validated.warnings[0].code(), "TYPE_REMAPPED");
    }

    #[test]
    fn test_remap_target_must_be_allowed() {
        let prefs = UserPreferences {
            allowed_types: vec!["feat".to_string(), "fix".to_string()],
            ..Default::default()
        };
        let err = validate(candidate("documentation: update guide"), &prefs).unwrap_err();
        assert_eq!(err.code(), "INVALID_COMMIT_FORMAT");
        assert!(matches!(
            err,
            ValidationError::InvalidCommitFormat {
                reason: FormatProblem::UnknownType(_),
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_type_fails() {
        let err = validate(candidate("wip: stuff"), &prefs()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidCommitFormat {
                reason: FormatProblem::UnknownType(ref ty),
                ..
            } if ty == "wip"
        ));
    }

    #[test]
    fn test_missing_prefix_is_synthesized() {
        let validated = validate(candidate("add user listing endpoint"), &prefs()).unwrap();
        assert_eq!(validated.message.subject, "feat(api): add user listing endpoint");
        assert_eq!(validated.warnings[0].code(), "PREFIX_SYNTHESIZED");
    }

    #[test]
    fn test_colon_without_prefix_is_unfixable() {
        let err = validate(candidate("note to self: add endpoint"), &prefs()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidCommitFormat {
                reason: FormatProblem::MissingPrefix,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_description_fails() {
        let err = validate(candidate("feat(api):   "), &prefs()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidCommitFormat {
                reason: FormatProblem::EmptyDescription,
                ..
            }
        ));
    }

    #[test]
    fn test_breaking_marker_is_kept() {
        let validated = validate(candidate("features(api)!: drop v1 routes"), &prefs()).unwrap();
        assert_eq!(validated.message.subject, "feat(api)!: drop v1 routes");
    }

    #[test]
    fn test_truncate_at_word_boundary() {
        let subject = "feat(components): add a considerably longer description than allowed here";
        let truncated = truncate_subject(subject, 30);
        assert!(truncated.chars().count() <= 30);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated, "feat(components): add a...");
    }

    #[test]
    fn test_truncate_hard_cut_without_late_boundary() {
        let subject = "feat(components): supercalifragilisticexpialidocious";
        let truncated = truncate_subject(subject, 30);
        assert_eq!(truncated.chars().count(), 30);
        assert_eq!(truncated, "feat(components): supercali...");
    }

    #[test]
    fn test_truncate_counts_characters() {
        let subject = "docs: ajouter la many éèàù caractères accentués partout ici";
        let truncated = truncate_subject(subject, 25);
        assert!(truncated.chars().count() <= 25);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_short_subject_is_not_truncated() {
        assert_eq!(truncate_subject("fix: typo", 72), "fix: typo");
    }

    #[test]
    fn test_length_checked_after_prefix_synthesis() {
        let prefs = UserPreferences {
            max_subject_length: 30,
            ..Default::default()
        };
        // 27 characters alone, 38 once the prefix is added.
        let validated = validate(candidate("add user listing endpoint x"), &prefs).unwrap();
        assert!(validated.message.subject.chars().count() <= 30);
        assert!(validated.message.subject.ends_with("..."));
        let codes: Vec<_> = validated.warnings.iter().map(|w| w.code()).collect();
        assert_eq!(codes, vec!["PREFIX_SYNTHESIZED", "MESSAGE_TOO_LONG"]);
    }

    #[test]
    fn test_custom_style_skips_format_checks() {
        let prefs = UserPreferences {
            style: CommitStyle::Custom,
            max_subject_length: 20,
            ..Default::default()
        };
        let validated = validate(candidate("[WIP] whatever I want to write"), &prefs).unwrap();
        assert!(!validated.message.is_conventional);
        assert!(validated.message.subject.starts_with("[WIP]"));
        assert!(validated.message.subject.chars().count() <= 20);

        assert_eq!(validate(candidate(""), &prefs).unwrap_err(), ValidationError::EmptyMessage);
    }
}
