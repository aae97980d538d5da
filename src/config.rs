//! User preferences: serde-defaulted JSON with CLI overrides applied on top.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classify::rename::RenameLiterals;
use crate::error::ConfigError;

/// File looked up in the repository root when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = ".scrivener.json";

pub const DEFAULT_MAX_SUBJECT_LENGTH: usize = 72;
pub const MIN_SUBJECT_LENGTH: usize = 20;
pub const MAX_SUBJECT_LENGTH: usize = 100;

/// Types accepted in a conventional subject unless configured otherwise.
pub const DEFAULT_ALLOWED_TYPES: [&str; 11] = [
    "feat", "fix", "docs", "style", "refactor", "perf", "test", "build", "ci", "chore", "revert",
];

/// How the subject line is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CommitStyle {
    /// `type(scope): description`
    #[default]
    Conventional,
    /// The description alone, or the configured template.
    Custom,
}

fn default_allowed_types() -> Vec<String> {
    DEFAULT_ALLOWED_TYPES.iter().map(|t| t.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPreferences {
    pub style: CommitStyle,
    pub allowed_types: Vec<String>,
    pub include_body: bool,
    pub max_subject_length: usize,
    pub infer_scope: bool,
    /// Custom-style template, e.g. `"[{Type}] {description}"`.
    pub template: Option<String>,
    /// A fixed before/after pair to treat as a project rename.
    pub rename_literals: Option<RenameLiterals>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            style: CommitStyle::default(),
            allowed_types: default_allowed_types(),
            include_body: false,
            max_subject_length: DEFAULT_MAX_SUBJECT_LENGTH,
            infer_scope: true,
            template: None,
            rename_literals: None,
        }
    }
}

impl UserPreferences {
    /// Bring out-of-range values back within bounds, warning about each fix.
    pub fn normalized(mut self) -> Self {
        let clamped = self
            .max_subject_length
            .clamp(MIN_SUBJECT_LENGTH, MAX_SUBJECT_LENGTH);
        if clamped != self.max_subject_length {
            warn!(
                requested = self.max_subject_length,
                using = clamped,
                "maxSubjectLength out of range [{MIN_SUBJECT_LENGTH}, {MAX_SUBJECT_LENGTH}]"
            );
            self.max_subject_length = clamped;
        }

        self.allowed_types = self
            .allowed_types
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if self.allowed_types.is_empty() {
            warn!("allowedTypes is empty, using the default list");
            self.allowed_types = default_allowed_types();
        }

        self
    }

    /// Whether `ty` is one of the allowed types (case-insensitive).
    pub fn allows(&self, ty: &str) -> bool {
        self.allowed_types.iter().any(|a| a.eq_ignore_ascii_case(ty))
    }
}

/// Read preferences from a JSON file.
pub fn load(path: &Path) -> Result<UserPreferences, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let prefs: UserPreferences = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "Loaded preferences");
    Ok(prefs.normalized())
}

/// Load `explicit` if given, else `<root>/.scrivener.json` if it exists, else defaults.
pub fn load_or_default(explicit: Option<&Path>, root: Option<&Path>) -> Result<UserPreferences, ConfigError> {
    if let Some(path) = explicit {
        return load(path);
    }
    let candidate: Option<PathBuf> = root.map(|r| r.join(DEFAULT_CONFIG_FILE));
    match candidate {
        Some(path) if path.is_file() => load(&path),
        _ => Ok(UserPreferences::default()),
    }
}
