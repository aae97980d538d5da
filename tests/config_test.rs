//! Integration tests for preferences files driving generation.

mod common;

use common::{TestRepo, added, change_set};
use scrivener::config::{DEFAULT_CONFIG_FILE, load_or_default};
use scrivener::{CommitStyle, ConfigError, Generator};

#[test]
fn test_repo_config_applies_template() {
    let test_repo = TestRepo::new();
    test_repo.write(
        DEFAULT_CONFIG_FILE,
        r#"{"style": "custom", "template": "[{Type}] {Description}"}"#,
    );

    let prefs = load_or_default(None, Some(test_repo.dir.path())).unwrap();
    assert_eq!(prefs.style, CommitStyle::Custom);

    let changes = change_set(vec![added("src/components/Button.tsx", 50)]);
    let generation = Generator::new(prefs).generate_fallback(&changes).unwrap();
    assert_eq!(generation.message.subject, "[Feat] Add Button");
    assert!(!generation.message.is_conventional);
}

#[test]
fn test_repo_config_disables_scope() {
    let test_repo = TestRepo::new();
    test_repo.write(DEFAULT_CONFIG_FILE, r#"{"inferScope": false}"#);

    let prefs = load_or_default(None, Some(test_repo.dir.path())).unwrap();
    let changes = change_set(vec![added("src/components/Button.tsx", 50)]);
    let generation = Generator::new(prefs).generate_fallback(&changes).unwrap();
    assert_eq!(generation.message.subject, "feat: add Button");
    assert_eq!(generation.message.scope, None);
}

#[test]
fn test_explicit_config_wins_over_repo_file() {
    let test_repo = TestRepo::new();
    test_repo.write(DEFAULT_CONFIG_FILE, r#"{"maxSubjectLength": 30}"#);
    test_repo.write("alt.json", r#"{"maxSubjectLength": 60, "includeBody": true}"#);

    let explicit = test_repo.dir.path().join("alt.json");
    let prefs = load_or_default(Some(&explicit), Some(test_repo.dir.path())).unwrap();
    assert_eq!(prefs.max_subject_length, 60);
    assert!(prefs.include_body);
}

#[test]
fn test_out_of_range_length_is_clamped_on_load() {
    let test_repo = TestRepo::new();
    test_repo.write(DEFAULT_CONFIG_FILE, r#"{"maxSubjectLength": 3, "allowedTypes": []}"#);

    let prefs = load_or_default(None, Some(test_repo.dir.path())).unwrap();
    assert_eq!(prefs.max_subject_length, 20);
    assert!(prefs.allows("feat"));
}

#[test]
fn test_wrong_field_type_is_parse_error() {
    let test_repo = TestRepo::new();
    test_repo.write(DEFAULT_CONFIG_FILE, r#"{"includeBody": "yes"}"#);

    let err = load_or_default(None, Some(test_repo.dir.path())).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains(DEFAULT_CONFIG_FILE));
}
