//! Ordered, weighted path rules that map a file to a category and commit type.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::classify::commit_type::CommitType;
use crate::classify::select::argmax_by;

/// Weight credited to paths no rule recognizes.
pub const DEFAULT_WEIGHT: f64 = 3.0;

/// Category reported for unmatched paths.
pub const DEFAULT_CATEGORY: &str = "other";

/// A single path rule.
#[derive(Debug)]
pub struct FileTypePattern {
    pub rule: Regex,
    pub category: &'static str,
    pub commit_type: CommitType,
    pub weight: f64,
}

/// Result of categorizing one path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileCategory {
    pub category: &'static str,
    pub commit_type: CommitType,
    pub weight: f64,
}

impl FileCategory {
    pub fn is_docs(&self) -> bool {
        self.category == "docs"
    }

    pub fn is_source(&self) -> bool {
        self.category == "source"
    }

    pub fn is_test(&self) -> bool {
        self.category == "test"
    }
}

fn pattern(rule: &str, category: &'static str, commit_type: CommitType, weight: f64) -> FileTypePattern {
    FileTypePattern {
        rule: Regex::new(rule).expect("file pattern table must compile"),
        category,
        commit_type,
        weight,
    }
}

/// The static rule table. Order matters only for equal weights.
pub static FILE_PATTERNS: LazyLock<Vec<FileTypePattern>> = LazyLock::new(|| {
    use CommitType::*;
    vec![
        // Well-known documents
        pattern(r"(?i)(^|/)readme(\.[a-z]+)?$", "docs", Docs, 10.0),
        pattern(r"(?i)(^|/)(changelog|changes|history)(\.[a-z]+)?$", "docs", Docs, 10.0),
        pattern(r"(?i)(^|/)(license|licence|contributing|code_of_conduct|authors)(\.[a-z]+)?$", "docs", Docs, 9.0),
        pattern(r"(?i)\.(md|mdx|rst|adoc|txt)$", "docs", Docs, 8.0),
        pattern(r"(?i)^docs?/", "docs", Docs, 7.0),
        // Tests
        pattern(r"(?i)\.(test|spec)\.[a-z0-9]+$", "test", Test, 10.0),
        pattern(r"(?i)_test\.(go|rs|py|rb|exs)$", "test", Test, 10.0),
        pattern(r"(?i)(^|/)test_[^/]+\.py$", "test", Test, 10.0),
        pattern(r"(?i)(^|/)(__tests__|tests?|spec|e2e)/", "test", Test, 9.0),
        // Dependency manifests and lockfiles
        pattern(
            r"(^|/)(package\.json|package-lock\.json|yarn\.lock|pnpm-lock\.yaml|Cargo\.toml|Cargo\.lock|go\.mod|go\.sum|requirements[^/]*\.txt|pyproject\.toml|poetry\.lock|Pipfile(\.lock)?|Gemfile(\.lock)?|composer\.(json|lock)|pom\.xml|build\.gradle(\.kts)?)$",
            "dependencies",
            Chore,
            9.0,
        ),
        // Tooling configuration
        pattern(
            r"(^|/)(tsconfig[^/]*\.json|jsconfig\.json|\.eslintrc[^/]*|eslint\.config\.[cm]?[jt]s|\.prettierrc[^/]*|prettier\.config\.[cm]?[jt]s|\.editorconfig|\.gitignore|\.gitattributes|\.npmignore|\.dockerignore|\.nvmrc|[^/]*\.config\.[cm]?[jt]s|rustfmt\.toml|clippy\.toml|Makefile|Dockerfile|docker-compose\.ya?ml)$",
            "config",
            Chore,
            8.0,
        ),
        pattern(r"^(\.github/|\.circleci/|\.gitlab-ci\.yml$|\.travis\.yml$|azure-pipelines\.yml$)", "ci", Chore, 8.0),
        pattern(r"(?i)\.(json|ya?ml|toml|ini|cfg|conf|env|properties)$", "config", Chore, 6.0),
        // Stylesheets
        pattern(r"(?i)\.(css|scss|sass|less|styl|pcss)$", "styles", Style, 7.0),
        // Paths that name their intent
        pattern(r"(?i)(^|/|[_.-])(bugfix|hotfix|fix|bug|patch)(es)?([_.-][^/]*)?$", "fix", Fix, 6.0),
        pattern(r"(?i)(^|/)(legacy|deprecated|old)/", "refactor", Refactor, 6.0),
        // Source code
        pattern(r"(?i)\.(ts|tsx|js|jsx|mjs|cjs|vue|svelte|astro)$", "source", Feat, 5.0),
        pattern(
            r"(?i)\.(rs|go|py|rb|java|kt|kts|swift|c|cc|cpp|cxx|h|hpp|cs|php|scala|ex|exs|dart|lua|zig)$",
            "source",
            Feat,
            5.0,
        ),
        pattern(r"(?i)\.(sh|bash|zsh|fish|ps1|bat)$", "scripts", Chore, 4.0),
    ]
});

/// Categorize a path by its best rule, or `None` if no rule matches.
pub fn categorize(path: &str) -> Option<FileCategory> {
    let path = path.replace('\\', "/");
    let best = argmax_by(
        FILE_PATTERNS.iter().filter(|p| p.rule.is_match(&path)),
        |p| p.weight,
    )?;
    Some(FileCategory {
        category: best.category,
        commit_type: best.commit_type,
        weight: best.weight,
    })
}

/// Categorize a path, falling back to the low-weight `other`/`feat` default.
pub fn categorize_or_default(path: &str) -> FileCategory {
    categorize(path).unwrap_or(FileCategory {
        category: DEFAULT_CATEGORY,
        commit_type: CommitType::Feat,
        weight: DEFAULT_WEIGHT,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(path: &str) -> (&'static str, CommitType) {
        let c = categorize_or_default(path);
        (c.category, c.commit_type)
    }

    #[test]
    fn test_readme_is_docs() {
        assert_eq!(cat("README.md"), ("docs", CommitType::Docs));
        assert_eq!(categorize("README.md").unwrap().weight, 10.0);
    }

    #[test]
    fn test_package_manifest_is_chore() {
        assert_eq!(cat("package.json"), ("dependencies", CommitType::Chore));
        assert_eq!(cat("crates/core/Cargo.toml"), ("dependencies", CommitType::Chore));
    }

    #[test]
    fn test_requirements_beats_plain_text() {
        assert_eq!(cat("requirements.txt"), ("dependencies", CommitType::Chore));
    }

    #[test]
    fn test_test_files() {
        assert_eq!(cat("src/components/Button.test.tsx"), ("test", CommitType::Test));
        assert_eq!(cat("tests/range_test.rs"), ("test", CommitType::Test));
        assert_eq!(cat("pkg/server_test.go"), ("test", CommitType::Test));
    }

    #[test]
    fn test_source_files() {
        assert_eq!(cat("src/components/Button.tsx"), ("source", CommitType::Feat));
        assert_eq!(cat("src/main.rs"), ("source", CommitType::Feat));
    }

    #[test]
    fn test_ci_and_config() {
        assert_eq!(cat(".github/workflows/ci.yml"), ("ci", CommitType::Chore));
        assert_eq!(cat("tsconfig.json"), ("config", CommitType::Chore));
        assert_eq!(cat("config/settings.yaml"), ("config", CommitType::Chore));
    }

    #[test]
    fn test_stylesheet_is_style() {
        assert_eq!(cat("src/app.scss"), ("styles", CommitType::Style));
    }

    #[test]
    fn test_fix_named_path() {
        assert_eq!(cat("src/hotfix_login.ts"), ("fix", CommitType::Fix));
    }

    #[test]
    fn test_fix_rule_ignores_embedded_words() {
        assert_eq!(cat("src/debug.ts"), ("source", CommitType::Feat));
        assert_eq!(cat("src/dispatch.ts"), ("source", CommitType::Feat));
    }

    #[test]
    fn test_unmatched_uses_default() {
        assert!(categorize("assets/logo.png").is_none());
        let c = categorize_or_default("assets/logo.png");
        assert_eq!(c.category, DEFAULT_CATEGORY);
        assert_eq!(c.commit_type, CommitType::Feat);
        assert_eq!(c.weight, DEFAULT_WEIGHT);
    }

    #[test]
    fn test_windows_separators() {
        assert_eq!(cat("docs\\guide.md"), ("docs", CommitType::Docs));
    }

    #[test]
    fn test_all_patterns_compile() {
        assert!(FILE_PATTERNS.len() > 10);
    }
}
