//! HTTP service for slide generation, PPTX export and user feedback.

pub mod error;
pub mod llm;
pub mod routes;

use axum::routing::{get, post};
use axum::Router;
use deck_core::{FeedbackStore, MemoryFeedbackStore, SlideAssembler};
use deck_pptx::PresentationExporter;
use std::sync::Arc;

pub use error::{ApiError, ApiResult};
pub use llm::{AnthropicClient, LlmClient};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// `None` serves the local assembler.
    pub llm: Option<Arc<dyn LlmClient>>,
    pub assembler: SlideAssembler,
    pub exporter: PresentationExporter,
    pub feedback: Arc<dyn FeedbackStore>,
}

impl AppState {
    pub fn new(feedback: Arc<dyn FeedbackStore>) -> Self {
        Self {
            llm: None,
            assembler: SlideAssembler::new(),
            exporter: PresentationExporter::new(),
            feedback,
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_assembler(mut self, assembler: SlideAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn with_exporter(mut self, exporter: PresentationExporter) -> Self {
        self.exporter = exporter;
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(MemoryFeedbackStore::new()))
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-slides", post(routes::generate))
        .route("/api/export", post(routes::export))
        .route(
            "/api/feedback",
            get(routes::feedback_summary)
                .post(routes::submit_feedback)
                .delete(routes::clear_feedback),
        )
        .route("/api/feedback/export", get(routes::export_feedback))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use chrono::NaiveDate;
    use deck_core::{FeedbackEntry, GenerationResponse, JsonFileFeedbackStore};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct FixedLlm(anyhow::Result<String>);

    #[async_trait]
    impl LlmClient for FixedLlm {
        async fn complete(&self, _system: &str, _prompt: &str) -> anyhow::Result<String> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(anyhow::anyhow!("{}", e)),
            }
        }

        fn model_name(&self) -> &str {
            "fixed-model"
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
    }

    fn state() -> AppState {
        AppState::default()
            .with_assembler(SlideAssembler::new().with_date(date()))
            .with_exporter(PresentationExporter::new().with_date(date()))
    }

    fn generate_body(slide_count: usize) -> Value {
        json!({
            "prompt": "Skapa presentation",
            "model": "opus",
            "request": {
                "purpose": "Statusuppdatering för projektet",
                "audience": "kollegor",
                "slideCount": slide_count,
                "details": "",
                "inspiration": "",
                "slideType": "agenda"
            }
        })
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    #[tokio::test]
    async fn test_generate_local() {
        let app = build_router(state());
        let response = app.oneshot(post_json("/api/generate-slides", &generate_body(4))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: GenerationResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert!(body.success);
        assert_eq!(body.model, routes::LOCAL_MODEL);
        assert_eq!(body.slides.len(), 4);
        assert_eq!(body.slides.last().unwrap().title, "Nästa steg & ansvar");
    }

    #[tokio::test]
    async fn test_generate_rejects_malformed_and_invalid() {
        let app = build_router(state());
        let malformed = Request::builder()
            .method("POST")
            .uri("/api/generate-slides")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(malformed).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert!(body["error"].as_str().unwrap().starts_with("Malformed request body"));

        let response = app.oneshot(post_json("/api/generate-slides", &generate_body(0))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_generate_with_llm() {
        let reply = r#"{"slides": [
            {"title": "A", "content": [], "slideType": "title"},
            {"title": "B", "content": ["x"], "slideType": "content"},
            {"title": "C", "content": ["y"], "slideType": "content"},
            {"title": "D", "content": ["z"], "slideType": "content"},
            {"title": "E", "content": ["w"], "slideType": "content"}
        ]}"#;
        let app = build_router(state().with_llm(Arc::new(FixedLlm(Ok(reply.to_string())))));
        let response = app.oneshot(post_json("/api/generate-slides", &generate_body(4))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: GenerationResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body.model, "fixed-model");
        let titles: Vec<_> = body.slides.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_generate_upstream_failure_is_bad_gateway() {
        let llm = FixedLlm(Err(anyhow::anyhow!("overloaded")));
        let app = build_router(state().with_llm(Arc::new(llm)));
        let response = app.oneshot(post_json("/api/generate-slides", &generate_body(4))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert!(body["error"].as_str().unwrap().contains("overloaded"));
    }

    #[tokio::test]
    async fn test_export_download() {
        let app = build_router(state());
        let body = json!({"slides": [{"title": "Hej", "content": ["Punkt"], "slideType": "content"}]});
        let response = app.clone().oneshot(post_json("/api/export", &body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"knowit-slides-2024-09-02.pptx\""
        );
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            deck_pptx::export::PPTX_CONTENT_TYPE
        );
        let bytes = body_bytes(response).await;
        assert_eq!(&bytes[..2], b"PK");

        let response = app.oneshot(post_json("/api/export", &json!({"slides": []}))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_feedback_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileFeedbackStore::new(dir.path().join("feedback.json")));
        let app = build_router(state_with(store));

        for body in [
            json!({"rating": "positive", "comment": "", "feature": "export", "url": "/"}),
            json!({"rating": "negative", "comment": "Långsam", "feature": "export", "timestamp": 5, "url": "/"}),
            json!({"rating": null, "comment": "Bra", "feature": "wizard", "url": "/"}),
        ] {
            let response = app.clone().oneshot(post_json("/api/feedback", &body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let empty = json!({"rating": null, "comment": "  ", "feature": "", "url": "/"});
        let response = app.clone().oneshot(post_json("/api/feedback", &empty)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let get = Request::builder().uri("/api/feedback").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(get).await.unwrap();
        let summary: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(summary["total"], 3);
        assert_eq!(summary["positive"], 1);
        assert_eq!(summary["negative"], 1);
        assert_eq!(summary["features"]["export"], 2);
        assert_eq!(summary["topFeature"], "export");
        assert_eq!(summary["recent"][0]["comment"], "Bra");
        assert_eq!(summary["recent"][1]["timestamp"], 5);
        assert!(summary["recent"][2]["timestamp"].as_i64().unwrap() > 0);

        let export = Request::builder().uri("/api/feedback/export").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(export).await.unwrap();
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(disposition.starts_with("attachment; filename=\"feedback-"));
        let exported: Vec<FeedbackEntry> = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(exported.len(), 3);

        let delete = Request::builder().method("DELETE").uri("/api/feedback").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(delete).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let get = Request::builder().uri("/api/feedback").body(Body::empty()).unwrap();
        let summary: Value = serde_json::from_slice(&body_bytes(app.oneshot(get).await.unwrap()).await).unwrap();
        assert_eq!(summary["total"], 0);
    }

    /// Store whose reads wait for a signal sent from another task on the
    /// same runtime.
    struct GatedStore {
        gate: std::sync::Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl FeedbackStore for GatedStore {
        fn entries(&self) -> deck_core::Result<Vec<FeedbackEntry>> {
            let gate = self.gate.lock().unwrap();
            gate.recv_timeout(std::time::Duration::from_secs(2)).map_err(|e| {
                std::io::Error::new(std::io::ErrorKind::TimedOut, e.to_string())
            })?;
            Ok(Vec::new())
        }

        fn append(&self, _entry: FeedbackEntry) -> deck_core::Result<()> {
            Ok(())
        }

        fn clear(&self) -> deck_core::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_feedback_store_runs_off_the_executor() {
        let (tx, rx) = std::sync::mpsc::channel();
        let app = build_router(state_with(Arc::new(GatedStore {
            gate: std::sync::Mutex::new(rx),
        })));

        // Only runs once the handler yields the single runtime thread
        tokio::spawn(async move {
            tx.send(()).unwrap();
        });

        let get = Request::builder().uri("/api/feedback").body(Body::empty()).unwrap();
        let response = app.oneshot(get).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    fn state_with(store: Arc<dyn FeedbackStore>) -> AppState {
        AppState {
            feedback: store,
            ..state()
        }
    }
}
