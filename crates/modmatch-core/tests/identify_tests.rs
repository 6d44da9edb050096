mod common;

use common::{Reply, TestServer};
use modmatch_core::catalog::CatalogClient;
use modmatch_core::hasher::fingerprint_bytes;
use modmatch_core::identify::{fuzzy_identify, identify_directory};
use modmatch_core::SilentReporter;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

const NO_EXACT: &str = r#"{"data": {"exactMatches": [], "partialMatches": [], "unmatchedFingerprints": []}}"#;
const ONE_EXACT: &str = r#"{"data": {"exactMatches": [{"id": 1, "file": {"id": 10, "fileName": "hair.package"}}], "exactFingerprints": []}}"#;

fn client_for(server: &TestServer) -> CatalogClient {
    CatalogClient::new(&server.base_url, "key", 78062, Duration::from_secs(5)).unwrap()
}

#[test]
fn test_identify_uses_game_scope_when_it_matches() {
    let server = TestServer::start(|_| Reply::json(200, ONE_EXACT));
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("hair.package"), "hair").unwrap();

    let identification =
        identify_directory(&client_for(&server), tmp.path(), &SilentReporter).unwrap();

    assert_eq!(identification.fingerprints, vec![fingerprint_bytes(b"hair")]);
    assert_eq!(identification.result.exact_matches.len(), 1);
    assert!(!identification.used_generic);
    assert_eq!(server.request_count(), 1);
}

#[test]
fn test_identify_retries_catalog_wide_without_exact_matches() {
    let server = TestServer::start(|request| {
        if request.path == "/v1/fingerprints/78062" {
            Reply::json(200, NO_EXACT)
        } else {
            Reply::json(200, ONE_EXACT)
        }
    });
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("hair.package"), "hair").unwrap();

    let identification =
        identify_directory(&client_for(&server), tmp.path(), &SilentReporter).unwrap();

    assert!(identification.used_generic);
    assert_eq!(identification.result.exact_matches.len(), 1);
    let paths: Vec<String> = server.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/v1/fingerprints/78062", "/v1/fingerprints"]);
}

#[test]
fn test_identify_empty_directory_makes_no_request() {
    let server = TestServer::start(|_| Reply::json(200, ONE_EXACT));
    let tmp = tempdir().unwrap();

    let identification =
        identify_directory(&client_for(&server), tmp.path(), &SilentReporter).unwrap();

    assert!(identification.result.is_empty());
    assert_eq!(server.request_count(), 0);
}

#[test]
fn test_identify_surfaces_service_errors() {
    let server = TestServer::start(|_| Reply::json(500, "{}"));
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("hair.package"), "hair").unwrap();

    let err = identify_directory(&client_for(&server), tmp.path(), &SilentReporter).unwrap_err();
    assert!(matches!(err, modmatch_core::Error::Catalog(_)));
}

#[test]
fn test_fuzzy_identify_submits_folder_groups() {
    let server = TestServer::start(|_| {
        Reply::json(200, r#"{"data": {"fuzzyMatches": [{"id": 5, "file": {"id": 50}}]}}"#)
    });
    let tmp = tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("Hair")).unwrap();
    fs::write(tmp.path().join("Hair/a.package"), "a").unwrap();
    fs::write(tmp.path().join("Hair/b.ts4script"), "b").unwrap();

    let (groups, result) =
        fuzzy_identify(&client_for(&server), tmp.path(), &SilentReporter).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].folder_name, "Hair");
    assert_eq!(result.fuzzy_matches[0].id, 5);
    let body = server.requests()[0].json();
    assert_eq!(body["fingerprints"][0]["foldername"], "Hair");
    assert_eq!(body["fingerprints"][0]["fingerprints"].as_array().unwrap().len(), 2);
}
