//! Message generation with AI override and deterministic fallback.
//!
//! The provider is injected; nothing here is global. Every AI failure, from a
//! missing command to a candidate that fails validation, becomes a [`Notice`]
//! and a fallback to the classifier. Only [`GenerationError`] escapes.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ai::json::extract_candidate;
use crate::ai::prompt::build_commit_prompt;
use crate::ai::provider::CommitMessageProvider;
use crate::classify::analysis::{ChangeAnalysis, Classifier};
use crate::classify::rename::{LiteralPairRule, RenameRule, SubstitutionRule};
use crate::config::{CommitStyle, UserPreferences};
use crate::diff::model::ChangeSet;
use crate::error::GenerationError;
use crate::message::format::{CommitMessage, effective_scope};
use crate::message::validate::{ValidationWarning, validate};

/// Where the final message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    Ai,
    Fallback,
}

impl MessageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageSource::Ai => "ai",
            MessageSource::Fallback => "fallback",
        }
    }
}

impl fmt::Display for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A soft failure worth telling the user about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// The provider failed or returned nothing usable.
    AiUnavailable { reason: String },
    /// The provider's candidate could not be validated.
    AiRejected {
        subject: String,
        code: &'static str,
        reason: String,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::AiUnavailable { reason } => {
                write!(f, "AI unavailable ({reason}); used deterministic message")
            }
            Notice::AiRejected { subject, reason, .. } => {
                write!(f, "AI suggestion '{subject}' rejected ({reason}); used deterministic message")
            }
        }
    }
}

/// The result of one generation call.
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    pub message: CommitMessage,
    pub source: MessageSource,
    pub warnings: Vec<ValidationWarning>,
    pub notices: Vec<Notice>,
    #[serde(skip)]
    pub analysis: ChangeAnalysis,
}

/// Rename rule implied by the preferences.
fn rename_rule(prefs: &UserPreferences) -> Box<dyn RenameRule> {
    match &prefs.rename_literals {
        Some(literals) => Box::new(LiteralPairRule::new(literals.old.clone(), literals.new.clone())),
        None => Box::new(SubstitutionRule),
    }
}

/// Produces commit messages for change sets.
pub struct Generator {
    prefs: UserPreferences,
    classifier: Classifier,
    provider: Option<Box<dyn CommitMessageProvider>>,
}

impl Generator {
    /// Out-of-range preferences are clamped before use.
    pub fn new(prefs: UserPreferences) -> Self {
        let prefs = prefs.normalized();
        let classifier = Classifier::new(rename_rule(&prefs)).with_allowed_types(prefs.allowed_types.clone());
        Self {
            prefs,
            classifier,
            provider: None,
        }
    }

    pub fn with_provider(mut self, provider: Box<dyn CommitMessageProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn analyze(&self, changes: &ChangeSet) -> ChangeAnalysis {
        self.classifier.classify(changes)
    }

    /// Generate without consulting the provider.
    pub fn generate_fallback(&self, changes: &ChangeSet) -> Result<Generation, GenerationError> {
        if changes.is_empty() {
            return Err(GenerationError::NoChanges);
        }
        self.fallback(self.analyze(changes), Vec::new())
    }

    /// Generate, preferring a valid provider candidate over the classifier's message.
    pub async fn generate(&self, changes: &ChangeSet) -> Result<Generation, GenerationError> {
        if changes.is_empty() {
            return Err(GenerationError::NoChanges);
        }
        let analysis = self.analyze(changes);

        let Some(provider) = &self.provider else {
            return self.fallback(analysis, Vec::new());
        };

        let prompt = build_commit_prompt(changes, &self.prefs);
        debug!(prompt_len = prompt.len(), "Requesting AI commit message");

        let candidate = match provider.complete(&prompt).await.and_then(|raw| extract_candidate(&raw)) {
            Ok(candidate) => candidate,
            Err(err) => {
                warn!(error = %err, "AI provider failed, falling back to classifier");
                let notice = Notice::AiUnavailable {
                    reason: err.to_string(),
                };
                return self.fallback(analysis, vec![notice]);
            }
        };

        let body = if self.prefs.include_body {
            candidate.body.clone().or_else(|| analysis.body.clone())
        } else {
            None
        };
        let message = CommitMessage {
            subject: candidate.subject.clone(),
            commit_type: analysis.commit_type.as_str().to_string(),
            scope: effective_scope(analysis.scope.as_deref(), &self.prefs).map(str::to_string),
            body,
            is_conventional: self.prefs.style == CommitStyle::Conventional,
        };

        match validate(message, &self.prefs) {
            Ok(validated) => {
                info!(source = %MessageSource::Ai, subject = %validated.message.subject, "Generated commit message");
                Ok(Generation {
                    message: validated.message,
                    source: MessageSource::Ai,
                    warnings: validated.warnings,
                    notices: Vec::new(),
                    analysis,
                })
            }
            Err(err) => {
                warn!(error = %err, subject = %candidate.subject, "AI candidate rejected, falling back to classifier");
                let notice = Notice::AiRejected {
                    subject: candidate.subject,
                    code: err.code(),
                    reason: err.to_string(),
                };
                self.fallback(analysis, vec![notice])
            }
        }
    }

    fn fallback(&self, analysis: ChangeAnalysis, notices: Vec<Notice>) -> Result<Generation, GenerationError> {
        let message = CommitMessage::from_analysis(&analysis, &self.prefs);
        let validated = validate(message, &self.prefs)?;
        info!(source = %MessageSource::Fallback, subject = %validated.message.subject, "Generated commit message");
        Ok(Generation {
            message: validated.message,
            source: MessageSource::Fallback,
            warnings: validated.warnings,
            notices,
            analysis,
        })
    }
}
