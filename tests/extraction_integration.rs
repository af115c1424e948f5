//! Integration tests for the full extraction pipeline.
//!
//! These tests run the scanner against the testdata fixtures and validate
//! the recovered endpoint sets.

use std::path::PathBuf;

use routescan::{Endpoint, ScanResult, Scanner};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Scan every Java fixture under testdata.
fn run_scan() -> ScanResult {
    let testdata = testdata_path();

    let files: Vec<PathBuf> = std::fs::read_dir(&testdata)
        .expect("should read testdata dir")
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|e| e == "java").unwrap_or(false))
        .collect();

    let scanner = Scanner::new(&testdata);
    scanner.run(&files)
}

fn find<'a>(result: &'a ScanResult, path: &str) -> &'a Endpoint {
    result
        .endpoints
        .iter()
        .find(|e| e.path == path)
        .unwrap_or_else(|| panic!("expected endpoint {:?} in {:?}", path, result.endpoints))
}

#[test]
fn test_scan_recovers_all_fixture_endpoints() {
    let result = run_scan();

    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    assert_eq!(result.scanned, 3);
    // LegacyService has no route annotation and contributes nothing.
    assert_eq!(result.endpoints.len(), 4);
    assert!(result
        .endpoints
        .iter()
        .all(|e| e.file != "LegacyService.java"));
}

#[test]
fn test_class_verbs_inherited_by_unannotated_method() {
    let result = run_scan();

    let list = find(&result, "/rest/users/list");
    assert_eq!(list.file, "UserController.java");
    assert_eq!(list.methods, vec!["GET", "POST"]);
    assert_eq!(list.parameters, vec!["query"]);
    assert_eq!(list.start_line, 13);
    // The inner if/for blocks must not cut the body short.
    assert_eq!(list.end_line, 21);
}

#[test]
fn test_method_verbs_override_and_both_parameter_forms() {
    let result = run_scan();

    let detail = find(&result, "/rest/users/detail");
    assert_eq!(detail.methods, vec!["GET"]);
    assert_eq!(detail.parameters, vec!["id", "tab"]);
    assert_eq!(detail.start_line, 23);
    assert_eq!(detail.end_line, 26);

    let save = find(&result, "/rest/users/save");
    assert_eq!(save.methods, vec!["POST"]);
    assert_eq!(save.parameters, vec!["name", "email"]);
}

#[test]
fn test_default_verb_when_nothing_declared() {
    let result = run_scan();

    let ping = find(&result, "/status/ping");
    assert_eq!(ping.file, "StatusController.java");
    assert_eq!(ping.methods, vec!["GET"]);
    assert!(ping.parameters.is_empty());
    assert_eq!(ping.start_line, 8);
    assert_eq!(ping.end_line, 11);
}

#[test]
fn test_iteration_order_is_file_then_path() {
    let result = run_scan();

    let order: Vec<(&str, &str)> = result
        .endpoints
        .iter()
        .map(|e| (e.file.as_str(), e.path.as_str()))
        .collect();

    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
}

#[test]
fn test_rescan_is_idempotent() {
    let first = run_scan();
    let second = run_scan();
    assert_eq!(first.endpoints, second.endpoints);
}

#[test]
fn test_single_file_parse_matches_scan() {
    let path = testdata_path().join("UserController.java");
    let endpoints = routescan::parse_file(&path).expect("fixture should be readable");

    // parse_file keys descriptors by the path it was given.
    assert_eq!(endpoints.len(), 3);
    assert!(endpoints
        .iter()
        .all(|e| e.file.ends_with("UserController.java")));
}
