//! Heuristics over raw diff lines: what kind of code was introduced.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::Serialize;

/// Removed lines required before a file counts as a pure deletion.
pub const PURE_DELETION_MIN_LINES: usize = 5;

/// The added and removed lines of a unified diff, markers stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffLines<'a> {
    pub added: Vec<&'a str>,
    pub removed: Vec<&'a str>,
}

/// Split diff text into added and removed lines.
///
/// Hunk headers (`@@`) are skipped, and so is a `---`/`+++` file header pair
/// before the first hunk of each file block. Inside a hunk, `---` and `+++`
/// are ordinary removed and added lines. The leading `+`/`-` is removed from
/// each kept line.
pub fn split_diff_lines(diff_text: &str) -> DiffLines<'_> {
    let mut lines = DiffLines::default();
    let mut in_header = true;
    let mut iter = diff_text.lines().peekable();
    while let Some(line) = iter.next() {
        if line.starts_with("diff --git ") {
            in_header = true;
            continue;
        }
        if line.starts_with("@@") {
            in_header = false;
            continue;
        }
        if in_header
            && line.starts_with("--- ")
            && iter.peek().is_some_and(|next| next.starts_with("+++ "))
        {
            iter.next();
            continue;
        }
        if let Some(rest) = line.strip_prefix('+') {
            lines.added.push(rest);
        } else if let Some(rest) = line.strip_prefix('-') {
            lines.removed.push(rest);
        }
    }
    lines
}

/// Whether a single file's diff only removes code.
///
/// More than [`PURE_DELETION_MIN_LINES`] non-empty removed lines and no
/// added lines at all. Small deletions and partial rewrites do not count.
pub fn is_pure_deletion(diff_text: &str) -> bool {
    let lines = split_diff_lines(diff_text);
    let removed = lines.removed.iter().filter(|l| !l.trim().is_empty()).count();
    removed > PURE_DELETION_MIN_LINES && lines.added.is_empty()
}

/// Kinds of added line the heuristics recognize, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Function,
    Class,
    Interface,
    Import,
    Config,
    Test,
    Comment,
}

impl ChangeKind {
    const ALL: [ChangeKind; 7] = [
        ChangeKind::Function,
        ChangeKind::Class,
        ChangeKind::Interface,
        ChangeKind::Import,
        ChangeKind::Config,
        ChangeKind::Test,
        ChangeKind::Comment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Function => "function",
            ChangeKind::Class => "class",
            ChangeKind::Interface => "interface",
            ChangeKind::Import => "import",
            ChangeKind::Config => "config",
            ChangeKind::Test => "test",
            ChangeKind::Comment => "comment",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signals detected in added lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentAnalysis {
    pub has_new_functions: bool,
    pub new_function_names: Vec<String>,
    pub has_imports: bool,
    pub has_config_changes: bool,
    pub has_test_changes: bool,
    pub has_class_changes: bool,
    pub has_null_checks: bool,
    pub has_validation: bool,
    pub dominant_change_kind: Option<ChangeKind>,
}

impl ContentAnalysis {
    /// Fold another file's signals into this one.
    pub fn merge(&mut self, other: ContentAnalysis) {
        self.has_new_functions |= other.has_new_functions;
        for name in other.new_function_names {
            if !self.new_function_names.contains(&name) {
                self.new_function_names.push(name);
            }
        }
        self.has_imports |= other.has_imports;
        self.has_config_changes |= other.has_config_changes;
        self.has_test_changes |= other.has_test_changes;
        self.has_class_changes |= other.has_class_changes;
        self.has_null_checks |= other.has_null_checks;
        self.has_validation |= other.has_validation;
    }
}

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("content pattern must compile")
}

/// Declarations whose `name` group is the function name.
static FUNCTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        re(r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*(?P<name>[A-Za-z_$][\w$]*)\s*\("),
        re(r"^\s*(?:export\s+)?(?:const|let|var)\s+(?P<name>[A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:\([^)]*\)|[A-Za-z_$][\w$]*)\s*(?::[^=]+)?=>"),
        re(r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?fn\s+(?P<name>[A-Za-z_]\w*)"),
        re(r"^\s*(?:async\s+)?def\s+(?P<name>[A-Za-z_]\w*)\s*\("),
        re(r"^\s*func\s+(?:\([^)]*\)\s*)?(?P<name>[A-Za-z_]\w*)\s*\("),
    ]
});

static CLASS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    re(r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?(?:pub(?:\([^)]*\))?\s+)?(?:class|struct|enum|trait|impl)\b")
});

static INTERFACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| re(r"^\s*(?:export\s+)?(?:declare\s+)?(?:interface|type)\s+[A-Za-z_$][\w$]*"));

static IMPORT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    re(r"^\s*(?:import\s|from\s+\S+\s+import\s|use\s+[\w:{]|#include\s|require\s)|\brequire\s*\(")
});

static CONFIG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    re(r#"^\s*["']?[\w.-]+["']?\s*[:=]\s*(?:"[^"]*"|'[^']*'|-?\d+(?:\.\d+)?|true|false|null|\[|\{)\s*,?\s*$"#)
});

static TEST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    re(r"\b(?:describe|it|test|expect)\s*\(|#\[(?:tokio::)?test\]|\bassert(?:_eq|_ne)?!\(|\bdef\s+test_")
});

static COMMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| re(r"^\s*(?://|/\*|\*/|\*\s|\*$|<!--|#\s|#$)"));

static NULL_CHECK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?:[!=]==?\s*(?:null|undefined)\b|\b(?:null|undefined)\s*[!=]==?|\?\.|\?\?|\bis\s+(?:not\s+)?None\b|\.is_none\(\)|\.is_some\(\)|\bif\s*\(\s*!\s*[\w.]+\s*\))")
});

static VALIDATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)\b(?:validat\w*|sanitiz\w*|is_?valid\w*|verify\w*|ensure\w*|schema|required|invalid\w*)\b")
});

fn function_name(line: &str) -> Option<String> {
    FUNCTION_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(line)
            .and_then(|caps| caps.name("name"))
            .map(|m| m.as_str().to_string())
    })
}

/// Scan added lines for declaration, import, config, test and guard patterns.
pub fn analyze_content(added: &[&str]) -> ContentAnalysis {
    let mut analysis = ContentAnalysis::default();
    let mut counts = [0usize; 7];

    for line in added {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(name) = function_name(line) {
            counts[ChangeKind::Function as usize] += 1;
            if !analysis.new_function_names.contains(&name) {
                analysis.new_function_names.push(name);
            }
        }
        if CLASS_PATTERN.is_match(line) {
            counts[ChangeKind::Class as usize] += 1;
        }
        if INTERFACE_PATTERN.is_match(line) {
            counts[ChangeKind::Interface as usize] += 1;
        }
        if IMPORT_PATTERN.is_match(line) {
            counts[ChangeKind::Import as usize] += 1;
        }
        if CONFIG_PATTERN.is_match(line) {
            counts[ChangeKind::Config as usize] += 1;
        }
        if TEST_PATTERN.is_match(line) {
            counts[ChangeKind::Test as usize] += 1;
        }
        if COMMENT_PATTERN.is_match(line) {
            counts[ChangeKind::Comment as usize] += 1;
        }
        if NULL_CHECK_PATTERN.is_match(line) {
            analysis.has_null_checks = true;
        }
        if VALIDATION_PATTERN.is_match(line) {
            analysis.has_validation = true;
        }
    }

    analysis.has_new_functions = counts[ChangeKind::Function as usize] > 0;
    analysis.has_class_changes = counts[ChangeKind::Class as usize] > 0;
    analysis.has_imports = counts[ChangeKind::Import as usize] > 0;
    analysis.has_config_changes = counts[ChangeKind::Config as usize] > 0;
    analysis.has_test_changes = counts[ChangeKind::Test as usize] > 0;
    analysis.dominant_change_kind = dominant_kind(&counts);
    analysis
}

/// Kind with the most matching lines; earlier kinds win ties.
fn dominant_kind(counts: &[usize; 7]) -> Option<ChangeKind> {
    let mut best: Option<(ChangeKind, usize)> = None;
    for kind in ChangeKind::ALL {
        let count = counts[kind as usize];
        if count > 0 && best.is_none_or(|(_, top)| count > top) {
            best = Some((kind, count));
        }
    }
    best.map(|(kind, _)| kind)
}

/// Analyze the added lines of a unified diff.
pub fn analyze_diff(diff_text: &str) -> ContentAnalysis {
    analyze_content(&split_diff_lines(diff_text).added)
}
