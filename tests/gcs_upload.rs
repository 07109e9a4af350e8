//! Upload flow against a mocked Cloud Storage API with service-account credentials.

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use startup_analyst::config::{Config, StorageBackend};
use startup_analyst::server::{create_router, AppState};
use startup_analyst::services::CloudServices;

const BUCKET: &str = "pitch-decks";

/// Write the fixture key with its token endpoint pointed at `server`.
fn write_key_file(dir: &tempfile::TempDir, server: &MockServer) -> PathBuf {
    let mut key: Value =
        serde_json::from_str(include_str!("fixtures/service-account.json")).unwrap();
    key["token_uri"] = json!(format!("{}/token", server.uri()));

    let path = dir.path().join("key.json");
    std::fs::write(&path, key.to_string()).unwrap();
    path
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.test-token",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn gcs_config(server: &MockServer, key_path: PathBuf) -> Config {
    let mut config = Config::default();
    config.google.credentials = Some(key_path);
    config.storage.backend = StorageBackend::Gcs;
    config.storage.bucket = BUCKET.to_string();
    config.storage.endpoint = server.uri();
    config
}

#[tokio::test]
async fn upload_returns_signed_read_url() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("POST"))
        .and(path(format!("/upload/storage/v1/b/{}/o", BUCKET)))
        .and(query_param("uploadType", "multipart"))
        .and(header("authorization", "Bearer ya29.test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "x"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/storage/v1/b/{}/o/startup-docs%2F1-deck.pdf", BUCKET)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = gcs_config(&server, write_key_file(&dir, &server));
    let storage = CloudServices::from_config(&config).unwrap().storage();

    let stored = storage
        .upload(b"%PDF-1.7", "startup-docs/1-deck.pdf", "application/pdf")
        .await
        .unwrap();

    assert_eq!(stored.bucket, BUCKET);
    assert_eq!(stored.size, 8);
    assert!(stored.url.starts_with(&format!(
        "{}/{}/startup-docs/1-deck.pdf?X-Goog-Algorithm=GOOG4-RSA-SHA256",
        server.uri(),
        BUCKET
    )));
    assert!(stored
        .url
        .contains("X-Goog-Credential=analyst%40test-project.iam.gserviceaccount.com%2F"));
    assert!(stored.url.contains("X-Goog-Expires=86400"));

    // 2048-bit RSA signature, hex encoded
    let signature = stored.url.rsplit("X-Goog-Signature=").next().unwrap();
    assert_eq!(signature.len(), 512);
    assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));

    // The cached token is reused for the delete
    assert!(storage.remove(&stored.name).await.succeeded());
}

#[tokio::test]
async fn upload_endpoint_reports_real_bucket() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("POST"))
        .and(path(format!("/upload/storage/v1/b/{}/o", BUCKET)))
        .and(body_string_contains("\"contentType\":\"application/pdf\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = gcs_config(&server, write_key_file(&dir, &server));
    let services = CloudServices::from_config(&config).unwrap();
    let app = create_router(AppState::new(services, &config));

    let boundary = "integration-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"deck.pdf\"\r\nContent-Type: application/pdf\r\n\r\n%PDF-1.7\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["uploadInfo"]["bucket"], BUCKET);
    assert_eq!(json["document"]["processed"], false);
    assert!(json["document"]["url"]
        .as_str()
        .unwrap()
        .contains("X-Goog-Signature="));
}

#[tokio::test]
async fn storage_failure_is_upload_failed() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("POST"))
        .and(path(format!("/upload/storage/v1/b/{}/o", BUCKET)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "The specified bucket does not exist."}
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = gcs_config(&server, write_key_file(&dir, &server));
    let err = CloudServices::from_config(&config)
        .unwrap()
        .storage()
        .upload(b"%PDF", "startup-docs/2-deck.pdf", "application/pdf")
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("File upload failed: "));
    assert!(err.to_string().contains("The specified bucket does not exist."));
}
