//! JSON API server for startup analysis.
//!
//! Endpoints:
//! - `POST /api/analyze`: structured analysis of pitch text for one category
//! - `GET /api/analyze`: API description
//! - `POST /api/upload`: pitch deck upload (PDF or PPTX)
//! - `POST /api/summary`: executive summary of prior analysis results
//! - `GET /api/health`: reachability of the cloud services

mod error;
mod handlers;
mod routes;

pub use error::ApiError;
pub use routes::create_router;

use std::net::SocketAddr;

use crate::analysis::AnalysisService;
use crate::config::Config;
use crate::services::CloudServices;
use crate::storage::DocumentStorage;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub services: CloudServices,
    pub analysis: AnalysisService,
    pub storage: DocumentStorage,
    /// Prefix of generated upload keys.
    pub key_prefix: String,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(services: CloudServices, config: &Config) -> Self {
        Self {
            analysis: services.analysis(),
            storage: services.storage(),
            services,
            key_prefix: config.storage.key_prefix.clone(),
            max_upload_bytes: config.server.max_upload_bytes,
        }
    }
}

/// Start the web server.
pub async fn serve(config: &Config, host: &str, port: u16) -> anyhow::Result<()> {
    let services = CloudServices::from_config(config)?;
    let app = create_router(AppState::new(services, config));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::llm::{GenerativeModel, LlmError, SamplingProfile};
    use crate::ocr::{OcrError, TextDetector};
    use crate::storage::PlaceholderStore;

    const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

    /// Model returning a fixed reply, or failing when none is set.
    struct CannedModel(Option<String>);

    #[async_trait]
    impl GenerativeModel for CannedModel {
        fn model_name(&self) -> &str {
            "gemini-test"
        }

        async fn generate(&self, _prompt: &str, _s: &SamplingProfile) -> Result<String, LlmError> {
            self.0
                .clone()
                .ok_or_else(|| LlmError::Api("Resource exhausted".to_string()))
        }
    }

    struct NoTextDetector;

    #[async_trait]
    impl TextDetector for NoTextDetector {
        async fn detect_document_text(&self, _bytes: &[u8]) -> Result<Option<String>, OcrError> {
            Ok(None)
        }

        async fn detect_text(&self, _bytes: &[u8]) -> Result<Vec<String>, OcrError> {
            Ok(vec![])
        }
    }

    fn app_with_model(reply: Option<&str>) -> axum::Router {
        let services = CloudServices::new(
            Arc::new(CannedModel(reply.map(str::to_string))),
            Arc::new(NoTextDetector),
            Arc::new(PlaceholderStore),
        );
        create_router(AppState::new(services, &Config::default()))
    }

    fn app() -> axum::Router {
        app_with_model(Some(r#"{"companyName": "Acme Robotics", "confidence": 78}"#))
    }

    async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_upload(filename: &str, content_type: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_api_info() {
        let (status, json) = send(
            app(),
            Request::builder()
                .uri("/api/analyze")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "AI Startup Analyst API");
        assert_eq!(json["powered_by"], "Google Cloud AI");
        assert!(json["endpoints"]["analyze"].is_string());
        assert!(json["endpoints"]["upload"].is_string());
    }

    #[tokio::test]
    async fn test_analyze_length_bounds() {
        let cases = [
            (49, StatusCode::BAD_REQUEST),
            (50, StatusCode::OK),
            (50_000, StatusCode::OK),
            (50_001, StatusCode::BAD_REQUEST),
        ];
        for (length, expected) in cases {
            let request = post_json(
                "/api/analyze",
                json!({"text": "a".repeat(length), "analysisType": "company"}),
            );
            let (status, _) = send(app(), request).await;
            assert_eq!(status, expected, "length {}", length);
        }
    }

    #[tokio::test]
    async fn test_analyze_success_envelope() {
        let request = post_json(
            "/api/analyze",
            json!({"text": "Acme Robotics builds autonomous forklifts for mid-size warehouses.", "analysisType": "company"}),
        );
        let (status, json) = send(app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["analysisType"], "company");
        assert_eq!(json["result"]["companyName"], "Acme Robotics");
        assert_eq!(json["metadata"]["textLength"], 66);
        assert_eq!(json["metadata"]["model"], "gemini-test");
        assert_eq!(json["metadata"]["confidence"], 78);
        assert!(json["metadata"]["processedAt"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_analyze_unparseable_reply_is_degraded_default() {
        let request = post_json(
            "/api/analyze",
            json!({"text": "x".repeat(80), "analysisType": "financial"}),
        );
        let (status, json) = send(app_with_model(Some("Sorry, no JSON today.")), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["result"]["confidence"], 50);
        assert_eq!(json["metadata"]["confidence"], 50);
    }

    #[tokio::test]
    async fn test_analyze_rejects_bogus_type() {
        let request = post_json(
            "/api/analyze",
            json!({"text": "x".repeat(80), "analysisType": "bogus"}),
        );
        let (status, json) = send(app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid analysis type");
        assert_eq!(
            json["validTypes"],
            json!(["company", "financial", "team", "market", "risk", "recommendation"])
        );
    }

    #[tokio::test]
    async fn test_analyze_missing_fields() {
        let (status, json) = send(app(), post_json("/api/analyze", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Text content is required for analysis");

        let (_, json) = send(app(), post_json("/api/analyze", json!({"text": "x".repeat(80)}))).await;
        assert_eq!(json["error"], "Analysis type is required");
    }

    #[tokio::test]
    async fn test_analyze_invalid_json_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, json) = send(app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().starts_with("Invalid JSON body"));
    }

    #[tokio::test]
    async fn test_analyze_model_failure_is_500() {
        let request = post_json(
            "/api/analyze",
            json!({"text": "x".repeat(80), "analysisType": "risk"}),
        );
        let (status, json) = send(app_with_model(None), request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Analysis failed");
        assert_eq!(
            json["details"],
            "AI analysis failed: API error: Resource exhausted"
        );
    }

    #[tokio::test]
    async fn test_upload_pdf() {
        let content = vec![b'%'; 10 * 1024 * 1024];
        let (status, json) = send(
            app(),
            multipart_upload("Acme Deck.pdf", "application/pdf", &content),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);

        let document = &json["document"];
        assert_eq!(document["name"], "Acme Deck.pdf");
        assert_eq!(document["type"], "pdf");
        assert_eq!(document["processed"], false);
        assert_eq!(document["size"], 10 * 1024 * 1024);
        assert!(document["id"].as_str().unwrap().starts_with("doc-"));

        let file_name = json["uploadInfo"]["fileName"].as_str().unwrap();
        assert!(file_name.starts_with("startup-docs/"));
        assert!(file_name.ends_with("-Acme Deck.pdf"));
        assert_eq!(document["url"], format!("demo/{}", file_name));
        assert_eq!(json["uploadInfo"]["bucket"], "demo-bucket");
    }

    #[tokio::test]
    async fn test_upload_pptx_by_extension() {
        let (status, json) = send(
            app(),
            multipart_upload("deck.PPTX", "application/octet-stream", b"PK\x03\x04"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["document"]["type"], "document");
    }

    #[tokio::test]
    async fn test_upload_rejects_executable() {
        let (status, json) = send(
            app(),
            multipart_upload("setup.exe", "application/x-msdownload", b"MZ"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["error"],
            "Invalid file type. Only PDF and PPTX files are supported."
        );
    }

    #[tokio::test]
    async fn test_upload_rejects_oversize_file() {
        let content = vec![0u8; 51 * 1024 * 1024];
        let (status, json) = send(
            app(),
            multipart_upload("big.pdf", "application/pdf", &content),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "File too large. Maximum size is 50MB.");
    }

    #[tokio::test]
    async fn test_upload_without_file() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        let (status, json) = send(app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No file provided");
    }

    #[tokio::test]
    async fn test_upload_requires_multipart_form() {
        let (status, json) = send(app(), post_json("/api/upload", json!({}))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Upload failed");
        assert!(!json["details"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary() {
        let request = post_json(
            "/api/summary",
            json!({"analysis": {"company": {"companyName": "Acme"}}}),
        );
        let (status, json) = send(app_with_model(Some("Acme looks strong.")), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["summary"], "Acme looks strong.");
        assert_eq!(json["degraded"], false);
    }

    #[tokio::test]
    async fn test_summary_degrades_instead_of_failing() {
        let request = post_json("/api/summary", json!({"analysis": {}}));
        let (status, json) = send(app_with_model(None), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["summary"], crate::analysis::SUMMARY_FALLBACK);
        assert_eq!(json["degraded"], true);
    }

    #[tokio::test]
    async fn test_summary_requires_analysis() {
        let (status, _) = send(app(), post_json("/api/summary", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["overall"], true);

        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app_with_model(None), request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["vertexAI"], false);
        assert_eq!(json["storage"], true);
    }
}
