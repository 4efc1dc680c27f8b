//! End-to-end push/pull/yank flows against a mock hub and blob store.
//!
//! One wiremock server plays both roles: the hub's signed-URL batch
//! endpoint and the blob store the signed URLs point at. Loopback signed
//! URLs use the object key as their path, which is exactly the shape the
//! pull path parser expects.

use std::fs;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use artifact_transfer::orchestrator::OrchestrateError;
use artifact_transfer::transfer::TransferError;
use artifact_transfer::{
    HubConfig, Orchestrator, PullOptions, PushOptions, ResourceScope, ScopeKind,
};

const TOKEN: &str = "test-token";

fn job_scope(id: &str) -> ResourceScope {
    ResourceScope {
        kind: ScopeKind::Job,
        identifier: id.to_string(),
    }
}

async fn orchestrator(server: &MockServer) -> Orchestrator {
    let config = HubConfig::new(TOKEN, &server.uri()).unwrap();
    Orchestrator::new(&config).unwrap()
}

fn hub_response(urls: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"urls": urls, "error": ""}))
}

#[tokio::test]
async fn push_requests_head_put_pair_per_artifact() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("x.zip");
    fs::write(&file, b"zip-bytes").unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/artifacts"))
        .and(header("authorization", TOKEN))
        .and(body_json(json!({
            "paths": ["artifacts/jobs/J1/x.zip"],
            "type": 0
        })))
        .respond_with(hub_response(json!([
            {"url": format!("{}/blob/x.zip", server.uri()), "method": "HEAD"},
            {"url": format!("{}/blob/x.zip", server.uri()), "method": "PUT"},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    // Object absent: HEAD misses, PUT lands.
    Mock::given(method("HEAD"))
        .and(path("/blob/x.zip"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/blob/x.zip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let stats = orchestrator(&server)
        .await
        .push(
            &job_scope("J1"),
            &PushOptions {
                source: file.to_str().unwrap().to_string(),
                destination: None,
                force: false,
            },
        )
        .await
        .unwrap();

    assert_eq!(stats.file_count, 1);
    assert_eq!(stats.total_bytes, b"zip-bytes".len() as u64);
}

#[tokio::test]
async fn push_blocked_when_remote_object_exists() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("x.zip");
    fs::write(&file, b"zip-bytes").unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/artifacts"))
        .respond_with(hub_response(json!([
            {"url": format!("{}/blob/x.zip", server.uri()), "method": "HEAD"},
            {"url": format!("{}/blob/x.zip", server.uri()), "method": "PUT"},
        ])))
        .mount(&server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/blob/x.zip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    // The paired PUT must never run.
    Mock::given(method("PUT"))
        .and(path("/blob/x.zip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = orchestrator(&server)
        .await
        .push(
            &job_scope("J1"),
            &PushOptions {
                source: file.to_str().unwrap().to_string(),
                destination: None,
                force: false,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrchestrateError::Transfer(TransferError::AlreadyExists { .. })
    ));
    assert!(err.to_string().contains("--force"));
}

#[tokio::test]
async fn forced_push_uses_one_url_per_artifact() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("x.zip");
    fs::write(&file, b"vv").unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/artifacts"))
        .and(body_json(json!({
            "paths": ["artifacts/jobs/J1/x.zip"],
            "type": 1
        })))
        .respond_with(hub_response(json!([
            {"url": format!("{}/blob/x.zip", server.uri()), "method": "PUT"},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/blob/x.zip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let stats = orchestrator(&server)
        .await
        .push(
            &job_scope("J1"),
            &PushOptions {
                source: file.to_str().unwrap().to_string(),
                destination: None,
                force: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(stats.file_count, 1);
    assert_eq!(stats.total_bytes, 2);
}

#[tokio::test]
async fn url_count_mismatch_aborts_before_any_transfer() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("x.zip");
    fs::write(&file, b"zz").unwrap();

    // One URL where a non-forced push needs two.
    Mock::given(method("POST"))
        .and(path("/api/v1/artifacts"))
        .respond_with(hub_response(json!([
            {"url": format!("{}/blob/x.zip", server.uri()), "method": "PUT"},
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&server)
        .await;

    let err = orchestrator(&server)
        .await
        .push(
            &job_scope("J1"),
            &PushOptions {
                source: file.to_str().unwrap().to_string(),
                destination: None,
                force: false,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrchestrateError::UrlCountMismatch {
            artifacts: 1,
            expected: 2,
            got: 1
        }
    ));
}

#[tokio::test]
async fn directory_push_preserves_substructure() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a"), b"A").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/b"), b"BB").unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/artifacts"))
        .and(body_json(json!({
            "paths": ["artifacts/jobs/J1/d/a", "artifacts/jobs/J1/d/sub/b"],
            "type": 0
        })))
        .respond_with(hub_response(json!([
            {"url": format!("{}/blob/d/a", server.uri()), "method": "HEAD"},
            {"url": format!("{}/blob/d/a", server.uri()), "method": "PUT"},
            {"url": format!("{}/blob/d/sub/b", server.uri()), "method": "HEAD"},
            {"url": format!("{}/blob/d/sub/b", server.uri()), "method": "PUT"},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let stats = orchestrator(&server)
        .await
        .push(
            &job_scope("J1"),
            &PushOptions {
                source: dir.path().to_str().unwrap().to_string(),
                destination: Some("d".to_string()),
                force: false,
            },
        )
        .await
        .unwrap();

    assert_eq!(stats.file_count, 2);
    assert_eq!(stats.total_bytes, 3);
}

#[tokio::test]
async fn pull_prefix_expands_and_counts_stats() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("first");

    Mock::given(method("POST"))
        .and(path("/api/v1/artifacts"))
        .and(body_json(json!({
            "paths": ["artifacts/jobs/J1/first"],
            "type": 2
        })))
        .respond_with(hub_response(json!([
            {"url": format!("{}/artifacts/jobs/J1/first/file1.txt", server.uri()), "method": "GET"},
            {"url": format!("{}/artifacts/jobs/J1/first/file2.txt", server.uri()), "method": "GET"},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/artifacts/jobs/J1/first/file1.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"one".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/artifacts/jobs/J1/first/file2.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"three".to_vec()))
        .mount(&server)
        .await;

    let stats = orchestrator(&server)
        .await
        .pull(
            &job_scope("J1"),
            &PullOptions {
                source: "first/".to_string(),
                destination: Some(dest.to_str().unwrap().to_string()),
                force: false,
            },
        )
        .await
        .unwrap();

    assert_eq!(stats.file_count, 2);
    assert_eq!(stats.total_bytes, 8);
    assert_eq!(fs::read(dest.join("file1.txt")).unwrap(), b"one");
    assert_eq!(fs::read(dest.join("file2.txt")).unwrap(), b"three");
}

#[tokio::test]
async fn pull_refuses_existing_local_file_without_force() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("out.txt");
    fs::write(&dest, b"precious").unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/artifacts"))
        .respond_with(hub_response(json!([
            {"url": format!("{}/artifacts/jobs/J1/out.txt", server.uri()), "method": "GET"},
        ])))
        .mount(&server)
        .await;
    // Nothing may be downloaded.
    Mock::given(method("GET"))
        .and(path("/artifacts/jobs/J1/out.txt"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = orchestrator(&server)
        .await
        .pull(
            &job_scope("J1"),
            &PullOptions {
                source: "out.txt".to_string(),
                destination: Some(dest.to_str().unwrap().to_string()),
                force: false,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestrateError::LocalExists { .. }));
    assert_eq!(fs::read(&dest).unwrap(), b"precious");
}

#[tokio::test]
async fn forced_pull_overwrites_existing_local_file() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("out.txt");
    fs::write(&dest, b"old").unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/artifacts"))
        .respond_with(hub_response(json!([
            {"url": format!("{}/artifacts/jobs/J1/out.txt", server.uri()), "method": "GET"},
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/artifacts/jobs/J1/out.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let stats = orchestrator(&server)
        .await
        .pull(
            &job_scope("J1"),
            &PullOptions {
                source: "out.txt".to_string(),
                destination: Some(dest.to_str().unwrap().to_string()),
                force: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(stats.file_count, 1);
    assert_eq!(fs::read(&dest).unwrap(), b"new");
}

#[tokio::test]
async fn yank_issues_delete_for_methodless_urls() {
    let server = MockServer::start().await;

    // The hub omits the method for yank batches.
    Mock::given(method("POST"))
        .and(path("/api/v1/artifacts"))
        .and(body_json(json!({
            "paths": ["artifacts/jobs/J1/stale.log"],
            "type": 3
        })))
        .respond_with(hub_response(json!([
            {"url": format!("{}/artifacts/jobs/J1/stale.log", server.uri())},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/artifacts/jobs/J1/stale.log"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let stats = orchestrator(&server)
        .await
        .yank(&job_scope("J1"), "stale.log")
        .await
        .unwrap();

    assert_eq!(stats.file_count, 1);
}

#[tokio::test]
async fn yank_of_missing_key_is_a_noop() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/artifacts"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let stats = orchestrator(&server)
        .await
        .yank(&job_scope("J1"), "never/existed")
        .await
        .unwrap();

    assert_eq!(stats.file_count, 0);
}

#[tokio::test]
async fn yank_tolerates_delete_of_vanished_object() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/artifacts"))
        .respond_with(hub_response(json!([
            {"url": format!("{}/artifacts/jobs/J1/gone.log", server.uri())},
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/artifacts/jobs/J1/gone.log"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let stats = orchestrator(&server)
        .await
        .yank(&job_scope("J1"), "gone.log")
        .await
        .unwrap();

    assert_eq!(stats.file_count, 0);
}

#[tokio::test]
async fn hub_5xx_is_retried_until_success() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("x.zip");
    fs::write(&file, b"x").unwrap();

    // Two transient failures, then a good batch. Mount order matters:
    // the expiring mock matches first until exhausted.
    Mock::given(method("POST"))
        .and(path("/api/v1/artifacts"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/artifacts"))
        .respond_with(hub_response(json!([
            {"url": format!("{}/blob/x.zip", server.uri()), "method": "PUT"},
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/blob/x.zip"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let stats = orchestrator(&server)
        .await
        .push(
            &job_scope("J1"),
            &PushOptions {
                source: file.to_str().unwrap().to_string(),
                destination: None,
                force: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(stats.file_count, 1);
}

#[tokio::test]
async fn hub_4xx_fails_immediately_without_retry() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("x.zip");
    fs::write(&file, b"x").unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/artifacts"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let err = orchestrator(&server)
        .await
        .push(
            &job_scope("J1"),
            &PushOptions {
                source: file.to_str().unwrap().to_string(),
                destination: None,
                force: true,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestrateError::Hub(_)));
}

#[tokio::test]
async fn hub_error_field_fails_the_whole_batch() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("x.zip");
    fs::write(&file, b"x").unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/artifacts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"urls": [], "error": "scope is not authorized"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = orchestrator(&server)
        .await
        .push(
            &job_scope("J1"),
            &PushOptions {
                source: file.to_str().unwrap().to_string(),
                destination: None,
                force: true,
            },
        )
        .await
        .unwrap_err();

    assert!(err.to_string().contains("scope is not authorized"));
}

#[tokio::test]
async fn put_5xx_is_retried_then_succeeds() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("x.zip");
    fs::write(&file, b"retry-me").unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/artifacts"))
        .respond_with(hub_response(json!([
            {"url": format!("{}/blob/x.zip", server.uri()), "method": "PUT"},
        ])))
        .mount(&server)
        .await;
    // Both attempts must carry the complete file body; a retry re-streams
    // the file from the start.
    Mock::given(method("PUT"))
        .and(path("/blob/x.zip"))
        .and(body_string("retry-me"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/blob/x.zip"))
        .and(body_string("retry-me"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let stats = orchestrator(&server)
        .await
        .push(
            &job_scope("J1"),
            &PushOptions {
                source: file.to_str().unwrap().to_string(),
                destination: None,
                force: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(stats.total_bytes, b"retry-me".len() as u64);
}

#[tokio::test]
async fn failed_pull_leaves_no_partial_file() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("out.txt");

    Mock::given(method("POST"))
        .and(path("/api/v1/artifacts"))
        .respond_with(hub_response(json!([
            {"url": format!("{}/artifacts/jobs/J1/out.txt", server.uri()), "method": "GET"},
        ])))
        .mount(&server)
        .await;
    // The signed URL no longer resolves; a 4xx is terminal.
    Mock::given(method("GET"))
        .and(path("/artifacts/jobs/J1/out.txt"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = orchestrator(&server)
        .await
        .pull(
            &job_scope("J1"),
            &PullOptions {
                source: "out.txt".to_string(),
                destination: Some(dest.to_str().unwrap().to_string()),
                force: false,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrchestrateError::Transfer(TransferError::RemoteRequestFailed { .. })
    ));
    assert!(!dest.exists());
}

#[tokio::test]
async fn empty_file_push_sends_bodyless_put() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("empty.marker");
    fs::write(&file, b"").unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/artifacts"))
        .respond_with(hub_response(json!([
            {"url": format!("{}/blob/empty.marker", server.uri()), "method": "PUT"},
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/blob/empty.marker"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let stats = orchestrator(&server)
        .await
        .push(
            &job_scope("J1"),
            &PushOptions {
                source: file.to_str().unwrap().to_string(),
                destination: None,
                force: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(stats.file_count, 1);
    assert_eq!(stats.total_bytes, 0);
}
