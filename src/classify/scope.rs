//! Scope inference by accumulated rule priority across all changed paths.

use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::debug;

use crate::classify::select::Tally;

/// Where a rule's scope name comes from.
#[derive(Debug, Clone, Copy)]
pub enum ScopeName {
    Fixed(&'static str),
    /// The rule's first capture group.
    Captured,
}

#[derive(Debug)]
pub struct ScopePattern {
    pub rule: Regex,
    pub scope: ScopeName,
    pub priority: f64,
}

fn fixed(rule: &str, scope: &'static str, priority: f64) -> ScopePattern {
    ScopePattern {
        rule: Regex::new(rule).expect("scope pattern table must compile"),
        scope: ScopeName::Fixed(scope),
        priority,
    }
}

fn captured(rule: &str, priority: f64) -> ScopePattern {
    ScopePattern {
        rule: Regex::new(rule).expect("scope pattern table must compile"),
        scope: ScopeName::Captured,
        priority,
    }
}

pub static SCOPE_PATTERNS: LazyLock<Vec<ScopePattern>> = LazyLock::new(|| {
    vec![
        fixed(r"(?i)(^|/)components?/", "components", 10.0),
        fixed(r"(?i)(^|/)(api|endpoints|routes)/", "api", 10.0),
        fixed(r"(?i)(^|/)(auth|authentication|login)/", "auth", 10.0),
        fixed(r"(?i)(^|/)(hooks)/", "hooks", 9.0),
        fixed(r"(?i)(^|/)(store|stores|state|redux)/", "store", 9.0),
        fixed(r"(?i)(^|/)(services?)/", "services", 8.0),
        fixed(r"(?i)(^|/)(models?|entities|schemas?)/", "models", 8.0),
        fixed(r"(?i)(^|/)(db|database|migrations)/", "db", 8.0),
        fixed(r"(?i)(^|/)(ui|views|pages|screens)/", "ui", 8.0),
        fixed(r"(?i)(^|/)(styles|css|themes?)/", "styles", 7.0),
        fixed(r"(?i)(^|/)(utils?|helpers|lib/utils)/", "utils", 7.0),
        fixed(r"(?i)(^|/)(types|typings|interfaces)/", "types", 7.0),
        fixed(r"(?i)(^|/)(cli|commands?)/", "cli", 7.0),
        fixed(r"(?i)(^|/)(config|configs|settings)/", "config", 6.0),
        fixed(r"^\.github/", "ci", 6.0),
        fixed(r"(?i)^docs?/", "docs", 6.0),
        fixed(r"(?i)(^|/)(__tests__|tests?|spec|e2e)/", "tests", 5.0),
        fixed(r"(?i)(^|/)scripts/", "scripts", 5.0),
        // Generic: the first directory under a conventional source root. A named
        // rule matching deeper in the same path outweighs it.
        captured(r"^(?:src|lib|app|packages|crates)/([A-Za-z0-9_-]+)/", 1.0),
    ]
});

/// Normalize a raw directory name into a scope label.
fn normalize_scope(raw: &str) -> Option<String> {
    let scope: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    (!scope.is_empty()).then_some(scope)
}

/// Sum every matching rule's priority per scope across all non-root paths.
pub fn scope_scores<'a, I>(paths: I) -> Tally
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tally = Tally::default();
    for path in paths {
        let path = path.replace('\\', "/");
        if !path.contains('/') {
            continue;
        }
        for pattern in SCOPE_PATTERNS.iter() {
            let name = match pattern.scope {
                ScopeName::Fixed(name) if pattern.rule.is_match(&path) => Some(name.to_string()),
                ScopeName::Fixed(_) => None,
                ScopeName::Captured => pattern
                    .rule
                    .captures(&path)
                    .and_then(|caps| caps.get(1))
                    .and_then(|m| normalize_scope(m.as_str())),
            };
            if let Some(name) = name {
                tally.add(&name, pattern.priority);
            }
        }
    }
    tally
}

/// Return the scope with the highest accumulated priority, if any rule matched.
pub fn detect_scope<'a, I>(paths: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let tally = scope_scores(paths);
    let winner = tally.winner().map(str::to_string);
    debug!(?winner, "Detected scope");
    winner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_scope() {
        assert_eq!(
            detect_scope(["src/components/Button.tsx"]),
            Some("components".to_string())
        );
    }

    #[test]
    fn test_root_files_are_ignored() {
        assert_eq!(detect_scope(["README.md", "package.json"]), None);
    }

    #[test]
    fn test_majority_beats_single_high_priority() {
        // One auth file (10 + 1) against four utils files (7 + 1 each).
        let paths = [
            "src/auth/login.ts",
            "src/utils/a.ts",
            "src/utils/b.ts",
            "src/utils/c.ts",
            "src/utils/d.ts",
        ];
        assert_eq!(detect_scope(paths), Some("utils".to_string()));
    }

    #[test]
    fn test_generic_source_directory() {
        assert_eq!(
            detect_scope(["src/classify/scope.rs", "src/classify/impact.rs"]),
            Some("classify".to_string())
        );
    }

    #[test]
    fn test_unmatched_nested_path_is_none() {
        assert_eq!(detect_scope(["assets/images/logo.png"]), None);
    }

    #[test]
    fn test_scores_accumulate() {
        let tally = scope_scores(["src/api/users.ts", "src/api/posts.ts"]);
        assert_eq!(tally.get("api"), 22.0);
    }

    #[test]
    fn test_adding_incumbent_files_keeps_winner() {
        let mut paths = vec!["src/api/users.ts", "src/hooks/useUser.ts"];
        let before = detect_scope(paths.iter().copied());
        paths.push("src/api/posts.ts");
        paths.push("src/api/comments.ts");
        assert_eq!(detect_scope(paths.iter().copied()), before);
    }
}
