//! Extraction of a commit candidate from a provider's raw response.
//!
//! Providers often wrap JSON in markdown code blocks or surround it with
//! conversational text. Free-text replies are accepted too.

use serde::{Deserialize, Serialize};

use crate::error::AiError;
use crate::message::validate::parse_subject;

/// What the provider proposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiCandidate {
    pub subject: String,
    #[serde(default)]
    pub body: Option<String>,
}

/// Extract a JSON object from a response that may be wrapped in markdown.
///
/// Tries, in order:
/// 1. Markdown ` ```json ... ``` ` fenced block
/// 2. Bare ` ``` ... ``` ` fenced block (if the content starts with `{`)
/// 3. Proper JSON parsing / balanced-brace extraction from surrounding text
/// 4. Returns the input unchanged as a last resort
pub fn extract_json(response: &str) -> String {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```json")
        && let Some(end) = trimmed[start + 7..].find("```")
    {
        return trimmed[start + 7..start + 7 + end].trim().to_string();
    }

    if let Some(start) = trimmed.find("```")
        && let Some(end) = trimmed[start + 3..].find("```")
    {
        let inner = trimmed[start + 3..start + 3 + end].trim();
        if inner.starts_with('{') {
            return inner.to_string();
        }
    }

    if let Some(json_str) = find_valid_json_object(trimmed) {
        return json_str;
    }

    trimmed.to_string()
}

/// First `{` that starts a parseable JSON object.
fn find_valid_json_object(text: &str) -> Option<String> {
    for (start_idx, _) in text.match_indices('{') {
        let candidate = &text[start_idx..];

        if let Ok(value) = serde_json::from_str::<serde_json::Value>(candidate)
            && let Ok(json_str) = serde_json::to_string(&value)
        {
            return Some(json_str);
        }

        if let Some(json_str) = extract_balanced_braces(candidate)
            && serde_json::from_str::<serde_json::Value>(&json_str).is_ok()
        {
            return Some(json_str);
        }
    }

    None
}

/// Substring with balanced braces from the first `{`, respecting string literals.
fn extract_balanced_braces(text: &str) -> Option<String> {
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (idx, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[..=idx].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

const SUBJECT_PREFIXES: [&str; 3] = ["commit message:", "subject:", "message:"];

/// Strip quoting and labels a model tends to wrap a subject line in.
fn clean_line(line: &str) -> String {
    let mut line = line.trim().trim_start_matches(['-', '*', '>']).trim();
    for prefix in SUBJECT_PREFIXES {
        if line.len() >= prefix.len()
            && line.is_char_boundary(prefix.len())
            && line[..prefix.len()].eq_ignore_ascii_case(prefix)
        {
            line = line[prefix.len()..].trim();
        }
    }
    line.trim_matches(|c| c == '"' || c == '\'' || c == '`').trim().to_string()
}

/// Subject from a free-text reply: the first conventional-looking line, else
/// the first non-empty one.
fn free_text_subject(text: &str) -> Option<String> {
    let lines: Vec<String> = text
        .lines()
        .filter(|l| !l.trim_start().starts_with("```"))
        .map(clean_line)
        .filter(|l| !l.is_empty())
        .collect();
    lines
        .iter()
        .find(|l| parse_subject(l).is_some())
        .or_else(|| lines.first())
        .cloned()
}

/// Turn a provider response into a candidate subject and body.
pub fn extract_candidate(response: &str) -> Result<AiCandidate, AiError> {
    if response.trim().is_empty() {
        return Err(AiError::EmptyResponse);
    }

    let json_str = extract_json(response);
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&json_str)
        && value.is_object()
    {
        let candidate: AiCandidate = serde_json::from_value(value)
            .map_err(|e| AiError::InvalidResponse(format!("JSON without a usable subject: {e}")))?;
        let body = candidate
            .body
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());
        return Ok(AiCandidate {
            subject: clean_line(candidate.subject.lines().next().unwrap_or("")),
            body,
        });
    }

    free_text_subject(response)
        .map(|subject| AiCandidate { subject, body: None })
        .ok_or(AiError::EmptyResponse)
}
