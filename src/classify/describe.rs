//! Natural-language descriptions for a change set.

use crate::classify::content::{ContentAnalysis, is_pure_deletion};
use crate::classify::patterns::{FileCategory, categorize_or_default};
use crate::diff::model::{ChangedFile, FileStatus};

/// Directories a "primary" source file is expected under.
const SOURCE_ROOTS: [&str; 6] = ["src/", "lib/", "app/", "components/", "pages/", "packages/"];

/// Body lines listed before collapsing into "and N more files".
const MAX_BODY_FILES: usize = 10;

/// Final path segment.
fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Display name for a file: extension stripped for code, tests named as tests.
pub fn display_name(path: &str, category: &FileCategory) -> String {
    let name = file_name(path);
    if category.is_test() {
        let stem = name.split('.').next().filter(|s| !s.is_empty()).unwrap_or(name);
        let stem = stem.strip_suffix("_test").unwrap_or(stem);
        let stem = stem.strip_prefix("test_").unwrap_or(stem);
        return format!("{stem} tests");
    }
    if category.is_source()
        && let Some((stem, _)) = name.rsplit_once('.')
        && !stem.is_empty()
    {
        return stem.to_string();
    }
    name.to_string()
}

fn only_deletes(file: &ChangedFile) -> bool {
    (file.additions == 0 && file.deletions > 0) || is_pure_deletion(&file.diff_text)
}

/// Phrase a single file change by its status.
fn describe_file(file: &ChangedFile) -> String {
    let category = categorize_or_default(&file.path);
    let name = display_name(&file.path, &category);
    match file.status {
        FileStatus::Added => format!("add {name}"),
        FileStatus::Deleted => format!("remove {name}"),
        FileStatus::Renamed => match file.old_path.as_deref() {
            Some(old) => {
                let old_name = display_name(old, &categorize_or_default(old));
                if old_name == name {
                    let dir = file.path.rsplit_once('/').map_or(".", |(dir, _)| dir);
                    format!("move {name} to {dir}")
                } else {
                    format!("rename {old_name} to {name}")
                }
            }
            None => format!("rename {name}"),
        },
        FileStatus::Modified if only_deletes(file) => format!("remove code from {name}"),
        FileStatus::Modified => format!("update {name}"),
    }
}

/// Split an identifier into lowercase words (camelCase, snake_case, kebab-case).
fn identifier_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '_' || c == '-' || c == '$' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Keyword-aware phrasing for one function name.
fn describe_function(name: &str) -> String {
    let words = identifier_words(name);
    let rest = |skip: &[&str]| {
        words
            .iter()
            .filter(|w| !skip.contains(&w.as_str()))
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    };
    let with_subject = |subject: String, noun: &str| {
        if subject.is_empty() {
            format!("add {noun}")
        } else {
            format!("add {subject} {noun}")
        }
    };

    let first = words.first().map(String::as_str).unwrap_or_default();
    let is_validation = matches!(first, "validate" | "validates" | "check" | "verify")
        || words.iter().any(|w| w == "valid" || w.starts_with("validat"));

    if is_validation {
        let subject = rest(&["validate", "validates", "validation", "validator", "check", "verify", "is", "valid"]);
        return with_subject(subject, "validation");
    }
    if words.len() > 1 && (first == "handle" || first == "on") {
        return with_subject(rest(&["handle", "on", "handler"]), "handler");
    }
    if words.len() > 1 && first == "get" {
        return with_subject(words[1..].join(" "), "getter");
    }
    if words.len() > 1 && first == "set" {
        return with_subject(words[1..].join(" "), "setter");
    }
    format!("add {name} function")
}

/// Phrase new functions, or `None` when file phrasing reads better.
fn describe_functions(names: &[String], file_stem: Option<&str>) -> Option<String> {
    match names {
        [] => None,
        [only] if file_stem.is_some_and(|stem| stem.eq_ignore_ascii_case(only)) => None,
        [only] => Some(describe_function(only)),
        [a, b] => Some(format!("add {a} and {b} functions")),
        [a, b, ..] => Some(format!("add {a}, {b} and more functions")),
    }
}

fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    name.split('.').next().unwrap_or(name)
}

/// The last added source file under a conventional source root, tests excluded.
fn primary_file<'a>(files: &'a [ChangedFile]) -> Option<(usize, &'a ChangedFile)> {
    files.iter().enumerate().rev().find(|(_, f)| {
        let path = f.normalized_path();
        let category = categorize_or_default(&path);
        f.status == FileStatus::Added
            && category.is_source()
            && SOURCE_ROOTS
                .iter()
                .any(|root| path.starts_with(root) || path.contains(&format!("/{root}")))
    })
}

/// Verb for change sets described as a whole.
fn collective_verb(files: &[ChangedFile]) -> &'static str {
    if files.iter().all(|f| f.status == FileStatus::Added) {
        "add"
    } else if files.iter().all(|f| f.status == FileStatus::Deleted) {
        "remove"
    } else {
        "update"
    }
}

/// Noun for a change set whose files all share one category.
fn uniform_category_noun(files: &[ChangedFile]) -> Option<&'static str> {
    let first = categorize_or_default(&files.first()?.path).category;
    if !files.iter().all(|f| categorize_or_default(&f.path).category == first) {
        return None;
    }
    match first {
        "docs" => Some("documentation"),
        "test" => Some("tests"),
        "dependencies" => Some("dependencies"),
        "config" => Some("configuration"),
        "ci" => Some("ci workflows"),
        "styles" => Some("styles"),
        "scripts" => Some("scripts"),
        _ => None,
    }
}

/// Describe a change set.
///
/// `contents` holds one [`ContentAnalysis`] per file, in the same order.
/// Content signals from the focus file win over path-based phrasing.
pub fn describe(files: &[ChangedFile], contents: &[ContentAnalysis], scope: Option<&str>) -> String {
    match files {
        [] => "update project".to_string(),
        [file] => {
            let content = contents.first();
            let category = categorize_or_default(&file.path);
            let name = display_name(&file.path, &category);

            if let Some(phrase) =
                content.and_then(|c| describe_functions(&c.new_function_names, Some(file_stem(&file.path))))
            {
                return phrase;
            }
            if file.status == FileStatus::Modified && category.is_source() && !only_deletes(file) {
                match content {
                    Some(c) if c.has_null_checks => return format!("handle missing values in {name}"),
                    Some(c) if c.has_validation => return format!("add validation to {name}"),
                    _ => {}
                }
            }
            describe_file(file)
        }
        _ => {
            if let Some((idx, primary)) = primary_file(files) {
                let names = contents.get(idx).map(|c| c.new_function_names.as_slice()).unwrap_or(&[]);
                if let Some(phrase) = describe_functions(names, Some(file_stem(&primary.path))) {
                    return phrase;
                }
                let name = display_name(&primary.path, &categorize_or_default(&primary.path));
                return format!("add {name} and related changes");
            }

            let verb = collective_verb(files);
            if let Some(noun) = uniform_category_noun(files) {
                return format!("{verb} {noun}");
            }
            match scope {
                Some(scope) => format!("{verb} {scope} implementation"),
                None => "update multiple components".to_string(),
            }
        }
    }
}

/// Optional body listing each file change.
pub fn describe_body(files: &[ChangedFile]) -> Option<String> {
    if files.len() < 2 {
        return None;
    }
    let mut lines: Vec<String> = files
        .iter()
        .take(MAX_BODY_FILES)
        .map(|f| {
            let verb = match f.status {
                FileStatus::Added => "add",
                FileStatus::Deleted => "remove",
                FileStatus::Renamed => "rename",
                FileStatus::Modified => "update",
            };
            format!("- {verb} {}", f.path)
        })
        .collect();
    if files.len() > MAX_BODY_FILES {
        lines.push(format!("- and {} more files", files.len() - MAX_BODY_FILES));
    }
    Some(lines.join("\n"))
}
