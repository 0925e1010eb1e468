use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("bc_report_locate_test_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_exact_name() {
    let root = make_temp_dir();
    fs::create_dir(root.join("fastqc")).unwrap();
    fs::create_dir(root.join("STAR")).unwrap();
    assert_eq!(locate_result_folder(&root, "fastqc").unwrap(), root.join("fastqc"));
}

#[test]
fn test_ordinal_prefix() {
    let root = make_temp_dir();
    fs::create_dir(root.join("03_STAR")).unwrap();
    assert_eq!(locate_result_folder(&root, "STAR").unwrap(), root.join("03_STAR"));
}

#[test]
fn test_non_ordinal_prefix_does_not_match() {
    let root = make_temp_dir();
    fs::create_dir(root.join("old_STAR")).unwrap();
    fs::create_dir(root.join("STAR_backup")).unwrap();
    let err = locate_result_folder(&root, "STAR").unwrap_err();
    assert!(err.to_string().contains("no result folder"));
}

#[test]
fn test_no_match() {
    let root = make_temp_dir();
    let err = locate_result_folder(&root, "cufflinks").unwrap_err();
    assert!(matches!(err, ReportError::Configuration(_)));
}

#[test]
fn test_ambiguous_match_names_candidates() {
    let root = make_temp_dir();
    fs::create_dir(root.join("00_fastqc")).unwrap();
    fs::create_dir(root.join("fastqc")).unwrap();
    let err = locate_result_folder(&root, "fastqc").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("ambiguous"));
    assert!(msg.contains("00_fastqc"));
    assert!(msg.contains("fastqc"));
}

#[test]
fn test_files_are_ignored() {
    let root = make_temp_dir();
    fs::write(root.join("01_cuffdiff"), "not a folder").unwrap();
    fs::create_dir(root.join("02_cuffdiff")).unwrap();
    assert_eq!(
        locate_result_folder(&root, "cuffdiff").unwrap(),
        root.join("02_cuffdiff")
    );
}

#[test]
fn test_repeated_lookup_is_stable() {
    let root = make_temp_dir();
    fs::create_dir(root.join("1_STAR")).unwrap();
    let first = locate_result_folder(&root, "STAR").unwrap();
    let second = locate_result_folder(&root, "STAR").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_name_is_matched_literally() {
    let root = make_temp_dir();
    fs::create_dir(root.join("abc")).unwrap();
    assert!(locate_result_folder(&root, "a.c").is_err());
    fs::create_dir(root.join("a.c")).unwrap();
    assert_eq!(locate_result_folder(&root, "a.c").unwrap(), root.join("a.c"));
}
