//! Commit message assembly: subject formatting, templates and the final text.

use serde::Serialize;

use crate::classify::analysis::ChangeAnalysis;
use crate::config::{CommitStyle, UserPreferences};

/// A commit message ready for display or validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitMessage {
    pub subject: String,
    /// Conventional type the subject carries, or the classifier's type in custom style.
    pub commit_type: String,
    pub scope: Option<String>,
    pub body: Option<String>,
    pub is_conventional: bool,
}

impl CommitMessage {
    /// Format the message for git.
    ///
    /// Produces:
    /// ```text
    /// type(scope): subject
    ///
    /// Body text.
    /// ```
    pub fn format(&self) -> String {
        match self.body.as_deref().map(str::trim) {
            Some(body) if !body.is_empty() => format!("{}\n\n{}", self.subject, body),
            _ => self.subject.clone(),
        }
    }

    /// Build the unvalidated message for a classifier result.
    pub fn from_analysis(analysis: &ChangeAnalysis, prefs: &UserPreferences) -> Self {
        let commit_type = analysis.commit_type.as_str();
        let scope = effective_scope(analysis.scope.as_deref(), prefs);
        let body = if prefs.include_body { analysis.body.clone() } else { None };
        let subject = format_subject(commit_type, scope, &analysis.description, prefs);

        let body = match (prefs.style, prefs.template.as_deref()) {
            (CommitStyle::Custom, Some(template)) => {
                let values = TemplateValues {
                    commit_type,
                    scope,
                    description: &analysis.description,
                    body: body.as_deref(),
                };
                split_rendered(&render_template(template, &values), body).1
            }
            _ => body,
        };

        Self {
            subject,
            commit_type: commit_type.to_string(),
            scope: scope.map(str::to_string),
            body,
            is_conventional: prefs.style == CommitStyle::Conventional,
        }
    }
}

/// The scope to print, honoring `infer_scope`.
pub fn effective_scope<'a>(scope: Option<&'a str>, prefs: &UserPreferences) -> Option<&'a str> {
    scope.filter(|s| prefs.infer_scope && !s.trim().is_empty())
}

/// `type(scope): description`, or `type: description` without a scope.
pub fn conventional_subject(commit_type: &str, scope: Option<&str>, description: &str) -> String {
    match scope {
        Some(scope) => format!("{commit_type}({scope}): {description}"),
        None => format!("{commit_type}: {description}"),
    }
}

/// Format a subject according to the configured style.
pub fn format_subject(
    commit_type: &str,
    scope: Option<&str>,
    description: &str,
    prefs: &UserPreferences,
) -> String {
    let scope = effective_scope(scope, prefs);
    match (prefs.style, prefs.template.as_deref()) {
        (CommitStyle::Conventional, _) => conventional_subject(commit_type, scope, description),
        (CommitStyle::Custom, Some(template)) => {
            let values = TemplateValues {
                commit_type,
                scope,
                description,
                body: None,
            };
            split_rendered(&render_template(template, &values), None).0
        }
        (CommitStyle::Custom, None) => description.to_string(),
    }
}

/// Values substituted into a custom template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateValues<'a> {
    pub commit_type: &'a str,
    pub scope: Option<&'a str>,
    pub description: &'a str,
    pub body: Option<&'a str>,
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Substitute `{type}`, `{scope}`, `{description}`, `{body}` and their
/// capitalized forms literally. Missing values become empty strings.
pub fn render_template(template: &str, values: &TemplateValues<'_>) -> String {
    let scope = values.scope.unwrap_or("");
    let body = values.body.unwrap_or("");
    let substitutions = [
        ("{type}", values.commit_type.to_string()),
        ("{Type}", capitalize(values.commit_type)),
        ("{scope}", scope.to_string()),
        ("{Scope}", capitalize(scope)),
        ("{description}", values.description.to_string()),
        ("{Description}", capitalize(values.description)),
        ("{body}", body.to_string()),
        ("{Body}", capitalize(body)),
    ];

    let mut out = String::with_capacity(template.len() + values.description.len());
    let mut rest = template;
    'scan: while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        for (placeholder, value) in &substitutions {
            if tail.starts_with(placeholder) {
                out.push_str(value);
                rest = &tail[placeholder.len()..];
                continue 'scan;
            }
        }
        out.push('{');
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}

/// First line is the subject; anything after it replaces the body.
fn split_rendered(rendered: &str, body: Option<String>) -> (String, Option<String>) {
    match rendered.split_once('\n') {
        Some((subject, rest)) if !rest.trim().is_empty() => {
            (subject.trim_end().to_string(), Some(rest.trim().to_string()))
        }
        Some((subject, _)) => (subject.trim_end().to_string(), body),
        None => (rendered.to_string(), body),
    }
}
