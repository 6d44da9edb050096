mod common;

use common::{Reply, TestServer};
use modmatch_core::catalog::{CatalogApi, CatalogClient};
use modmatch_core::scanner::FolderFingerprintGroup;
use modmatch_core::CatalogError;
use std::time::Duration;

const MATCH_BODY: &str = r#"{"data": {
    "isCacheBuilt": true,
    "exactMatches": [{"id": 3, "file": {"id": 30, "modId": 3, "fileName": "x.package", "downloadUrl": "https://cdn/x.package"}, "latestFiles": []}],
    "exactFingerprints": [11],
    "partialMatches": [],
    "partialMatchFingerprints": {},
    "installedFingerprints": [],
    "unmatchedFingerprints": [22]
}}"#;

fn client_for(server: &TestServer) -> CatalogClient {
    CatalogClient::new(&server.base_url, "secret-key", 78062, Duration::from_secs(5)).unwrap()
}

#[test]
fn test_match_exact_posts_deduplicated_fingerprints_to_game_endpoint() {
    let server = TestServer::start(|_| Reply::json(200, MATCH_BODY));
    let client = client_for(&server);

    let result = client.match_exact(&[22, 11, 22, 11]).unwrap();
    assert_eq!(result.exact_matches.len(), 1);
    assert_eq!(result.unmatched_fingerprints, vec![22]);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/v1/fingerprints/78062");
    assert_eq!(request.header("x-api-key"), Some("secret-key"));
    assert_eq!(request.header("accept"), Some("application/json"));
    assert_eq!(request.json(), serde_json::json!({"fingerprints": [22, 11]}));
}

#[test]
fn test_match_exact_generic_uses_unscoped_endpoint() {
    let server = TestServer::start(|_| Reply::json(200, MATCH_BODY));
    let client = client_for(&server);

    client.match_exact_generic(&[11]).unwrap();
    assert_eq!(server.requests()[0].path, "/v1/fingerprints");
}

#[test]
fn test_match_fuzzy_sends_folder_groups() {
    let server = TestServer::start(|_| {
        Reply::json(200, r#"{"data": {"fuzzyMatches": [{"id": 9, "file": {"id": 90}}]}}"#)
    });
    let client = client_for(&server);

    let groups = vec![FolderFingerprintGroup {
        folder_name: "CoolHair".to_string(),
        fingerprints: vec![5, 6],
    }];
    let result = client.match_fuzzy(&groups).unwrap();
    assert_eq!(result.fuzzy_matches.len(), 1);
    assert_eq!(result.fuzzy_matches[0].id, 9);

    let request = &server.requests()[0];
    assert_eq!(request.path, "/v1/fingerprints/fuzzy");
    assert_eq!(
        request.json(),
        serde_json::json!({
            "gameId": 78062,
            "fingerprints": [{"foldername": "CoolHair", "fingerprints": [5, 6]}]
        })
    );
}

#[test]
fn test_file_download_url_treats_empty_as_none() {
    let server = TestServer::start(|request| {
        if request.path.contains("/files/2/") {
            Reply::json(200, r#"{"data": ""}"#)
        } else {
            Reply::json(200, r#"{"data": "https://edge/file.package"}"#)
        }
    });
    let client = client_for(&server);

    assert_eq!(
        client.file_download_url(1, 1).unwrap().as_deref(),
        Some("https://edge/file.package")
    );
    assert_eq!(client.file_download_url(1, 2).unwrap(), None);
    assert_eq!(server.requests()[0].path, "/v1/mods/1/files/1/download-url");
}

#[test]
fn test_non_success_status_is_service_error() {
    let server = TestServer::start(|_| Reply::json(403, r#"{"error": "bad key"}"#));
    let client = client_for(&server);

    match client.match_exact(&[1]).unwrap_err() {
        CatalogError::Service { status, body, .. } => {
            assert_eq!(status, 403);
            assert!(body.contains("bad key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_garbage_body_is_decode_error() {
    let server = TestServer::start(|_| Reply::json(200, "<html>maintenance</html>"));
    let client = client_for(&server);

    let err = client.file_download_url(1, 1).unwrap_err();
    assert!(matches!(err, CatalogError::Decode { .. }));
}

#[test]
fn test_unreachable_service_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let client = CatalogClient::new(
        &format!("http://{}", address),
        "key",
        78062,
        Duration::from_secs(2),
    )
    .unwrap();
    let err = client.match_exact(&[1]).unwrap_err();
    assert!(matches!(err, CatalogError::Network { .. }));
}

#[test]
fn test_mod_lookups_decode_catalog_records() {
    let server = TestServer::start(|request| match request.path.as_str() {
        "/v1/mods/77" => Reply::json(
            200,
            r#"{"data": {"id": 77, "name": "Thing", "slug": "thing", "links": {"websiteUrl": "https://site/thing"}, "mainFileId": 5001}}"#,
        ),
        "/v1/mods/77/files" => Reply::json(
            200,
            r#"{"data": [{"id": 5001, "modId": 77, "fileName": "thing.package", "fileLength": 10, "fileFingerprint": 123, "modules": [{"name": "thing.package", "fingerprint": 123}]}]}"#,
        ),
        _ => Reply::status(404),
    });
    let client = client_for(&server);

    let owner = client.get_mod(77).unwrap();
    assert_eq!(owner.slug, "thing");
    assert_eq!(owner.links.website_url, "https://site/thing");

    let files = client.get_mod_files(77).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].modules[0].fingerprint, 123);
}
