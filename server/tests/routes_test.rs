use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use mdenhance_core::{ChatCompletion, ChatRequest, EnhanceService, ProviderDefaults, Result};
use mdenhance_server::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const KEY: &str = "sk-test0123456789abcdefghij";

/// Counts calls and answers with a fixed reply
struct StubLlm {
    calls: AtomicUsize,
    reply: String,
}

impl StubLlm {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: reply.to_string(),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatCompletion for StubLlm {
    async fn complete(&self, _request: ChatRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

fn app(stub: Arc<StubLlm>) -> Router {
    router(AppState::new(EnhanceService::new(ProviderDefaults::default(), stub)))
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

async fn post_enhance(app: Router, body: String) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/enhance")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn root_reports_running() {
    let (status, body) = get(app(StubLlm::new("")), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert!(body["message"].as_str().unwrap().contains("API"));
}

#[tokio::test]
async fn both_health_routes_report_healthy() {
    for uri in ["/health", "/api/health"] {
        let (status, body) = get(app(StubLlm::new("")), uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        let ts = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok(), "bad timestamp {ts}");
    }
}

#[tokio::test]
async fn enhance_success_round_trip() {
    let stub = StubLlm::new("## Part 1\n\nHello");
    let body = json!({
        "content": "Hello markdown world",
        "task_type": "segment_text",
        "aiConfig": { "apiKey": KEY }
    });
    let resp = post_enhance(app(stub.clone()), body.to_string()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({ "success": true, "enhanced_content": "## Part 1\n\nHello" })
    );
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn enhance_failures_still_return_200() {
    let stub = StubLlm::new("unused");
    let cases = [
        json!({ "content": "   ", "task_type": "auto_image" }),
        json!({ "content": "# Doc", "task_type": "nonsense" }),
        json!({ "content": "# Doc", "task_type": "auto_image", "aiConfig": { "apiKey": "placeholder" } }),
        json!({ "content": "# Doc", "task_type": "auto_image", "aiConfig": { "apiKey": KEY, "temperature": 3.0 } }),
    ];
    for case in cases {
        let resp = post_enhance(app(stub.clone()), case.to_string()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["success"], false, "{case}");
        assert!(body["error"].is_string(), "{case}");
        assert!(body.get("enhanced_content").is_none(), "{case}");
    }
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn custom_css_bypasses_model() {
    let stub = StubLlm::new("unused");
    let body = json!({
        "content": "# Doc",
        "task_type": "auto_css_style",
        "options": { "customCSS": "body{color:red}" }
    });
    let resp = post_enhance(app(stub.clone()), body.to_string()).await;
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["enhanced_content"], "body{color:red}");
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn malformed_json_is_rejected_by_extractor() {
    let resp = post_enhance(app(StubLlm::new("")), "{not json".to_string()).await;
    assert!(resp.status().is_client_error());
}
