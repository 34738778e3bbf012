use std::fs;
use std::path::{Path, PathBuf};

use togif::{resolve_pattern, resolve_patterns, TogifError};

fn fixture_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in ["frame1.png", "frame3.png", "frame2.png", "test1.png", "test2.png", "other.txt"] {
        fs::write(dir.path().join(name), b"").unwrap();
    }
    dir
}

fn pattern_in(dir: &Path, base: &str) -> String {
    format!("{}/{}", dir.display(), base)
}

fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_regex_pattern_sorted() {
    let dir = fixture_dir();
    let files = resolve_pattern(&pattern_in(dir.path(), r"frame[0-9]+\.png")).unwrap();
    assert_eq!(names(&files), ["frame1.png", "frame2.png", "frame3.png"]);
    assert!(files.iter().all(|p| p.starts_with(dir.path())));
}

#[test]
fn test_anchored_regex() {
    let dir = fixture_dir();
    let files = resolve_pattern(&pattern_in(dir.path(), r"^test\d")).unwrap();
    assert_eq!(names(&files), ["test1.png", "test2.png"]);
}

#[test]
fn test_glob_patterns() {
    let dir = fixture_dir();

    let all = resolve_pattern(&pattern_in(dir.path(), "*.png")).unwrap();
    assert_eq!(all.len(), 5);
    assert!(!names(&all).contains(&"other.txt".to_string()));

    let tests = resolve_pattern(&pattern_in(dir.path(), "test*.png")).unwrap();
    assert_eq!(names(&tests), ["test1.png", "test2.png"]);
}

#[test]
fn test_glob_never_returns_other_extensions() {
    let dir = fixture_dir();
    assert!(resolve_pattern(&pattern_in(dir.path(), "*.txt")).is_err());
    assert!(matches!(
        resolve_pattern(&pattern_in(dir.path(), "other?txt")),
        Err(TogifError::NoMatches { .. })
    ));
}

#[test]
fn test_literal_miss_is_an_error() {
    let dir = fixture_dir();
    let result = resolve_pattern(&pattern_in(dir.path(), "nonexistent.png"));
    match result {
        Err(TogifError::NoMatches { pattern }) => assert!(pattern.ends_with("nonexistent.png")),
        other => panic!("expected NoMatches, got {:?}", other),
    }
}

#[test]
fn test_missing_directory() {
    let dir = fixture_dir();
    let missing = dir.path().join("nope");
    let result = resolve_pattern(&pattern_in(&missing, "*.png"));
    assert!(matches!(result, Err(TogifError::DirectoryMissing { .. })));
}

#[test]
fn test_invalid_regex() {
    let dir = fixture_dir();
    let result = resolve_pattern(&pattern_in(dir.path(), "frame(.png"));
    assert!(matches!(result, Err(TogifError::InvalidPattern { .. })));
}

#[test]
fn test_multiple_patterns_keep_flag_order_without_duplicates() {
    let dir = fixture_dir();
    let files = resolve_patterns(&[
        pattern_in(dir.path(), "test*.png"),
        pattern_in(dir.path(), "*.png"),
    ])
    .unwrap();
    assert_eq!(
        names(&files),
        ["test1.png", "test2.png", "frame1.png", "frame2.png", "frame3.png"]
    );
}

#[test]
fn test_one_failing_pattern_fails_all() {
    let dir = fixture_dir();
    let result = resolve_patterns(&[
        pattern_in(dir.path(), "*.png"),
        pattern_in(dir.path(), "missing*.png"),
    ]);
    assert!(result.is_err());
}
