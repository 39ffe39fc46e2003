//! Remote-first slide generation.
//!
//! One remote attempt; anything other than a usable deck falls back to the
//! local assembler for the same request. Callers always get slides.

use crate::error::{GatewayError, Result};
use crate::remote::RemoteGenerator;
use deck_core::wire::DEFAULT_REMOTE_MODEL;
use deck_core::{
    build_generation_prompt, GeneratedSlide, GenerationPayload, SlideAssembler, SlideKind,
    SlideRequest, HOUSE_STYLE,
};
use std::fmt;
use std::sync::Arc;

/// Which path produced a deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationSource {
    Remote { model: String },
    Local,
}

impl fmt::Display for GenerationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationSource::Remote { model } => write!(f, "remote ({})", model),
            GenerationSource::Local => write!(f, "local heuristics"),
        }
    }
}

/// Slides plus their source.
#[derive(Debug, Clone)]
pub struct Generation {
    pub slides: Vec<GeneratedSlide>,
    pub source: GenerationSource,
}

pub struct GenerationGateway {
    remote: Option<Arc<dyn RemoteGenerator>>,
    assembler: SlideAssembler,
    model: String,
}

impl GenerationGateway {
    /// Try `remote` first.
    pub fn new(remote: impl RemoteGenerator + 'static) -> Self {
        Self {
            remote: Some(Arc::new(remote)),
            assembler: SlideAssembler::new(),
            model: DEFAULT_REMOTE_MODEL.to_string(),
        }
    }

    /// Never leave the process.
    pub fn local_only() -> Self {
        Self {
            remote: None,
            assembler: SlideAssembler::new(),
            model: DEFAULT_REMOTE_MODEL.to_string(),
        }
    }

    pub fn with_assembler(mut self, assembler: SlideAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Model name requested from the remote.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Payload sent for `request`.
    pub fn payload(&self, request: &SlideRequest) -> GenerationPayload {
        GenerationPayload {
            prompt: build_generation_prompt(request, &HOUSE_STYLE),
            model: self.model.clone(),
            request: request.clone(),
        }
    }

    pub async fn generate(&self, request: &SlideRequest) -> Vec<GeneratedSlide> {
        self.generate_with_source(request).await.slides
    }

    pub async fn generate_with_source(&self, request: &SlideRequest) -> Generation {
        if let Some(remote) = &self.remote {
            let payload = self.payload(request);
            log::debug!("Requesting {} slides from {}", request.effective_slide_count(), remote.describe());

            let remote_deck = remote
                .generate(&payload)
                .await
                .and_then(|response| Ok((fit_to_request(response.slides, request)?, response.model)));

            match remote_deck {
                Ok((slides, model)) => {
                    log::info!("Remote generated {} slides with {}", slides.len(), model);
                    return Generation {
                        slides,
                        source: GenerationSource::Remote { model },
                    };
                }
                Err(e) => {
                    log::warn!("Remote generation unavailable, using local fallback: {}", e);
                }
            }
        }

        let slides = self.assembler.assemble(request);
        log::debug!("Assembled {} slides locally", slides.len());
        Generation {
            slides,
            source: GenerationSource::Local,
        }
    }
}

/// Bound a remote deck to the requested size and check it has the shape
/// the local assembler always produces.
fn fit_to_request(mut slides: Vec<GeneratedSlide>, request: &SlideRequest) -> Result<Vec<GeneratedSlide>> {
    slides.truncate(request.effective_slide_count());

    match slides.first() {
        None => return Err(GatewayError::EmptyDeck),
        Some(first) if first.slide_type != SlideKind::Title => {
            return Err(GatewayError::InvalidDeck(format!(
                "first slide is {:?}, not a title slide",
                first.slide_type
            )));
        }
        Some(_) => {}
    }
    if let Some(pos) = slides.iter().position(|s| s.title.trim().is_empty()) {
        return Err(GatewayError::InvalidDeck(format!("slide {} has no title", pos + 1)));
    }
    Ok(slides)
}

impl fmt::Debug for GenerationGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationGateway")
            .field("remote", &self.remote.as_ref().map(|r| r.describe()))
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::HttpGenerator;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use chrono::NaiveDate;
    use deck_core::{Audience, GenerationResponse, RequestedSlideType};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request() -> SlideRequest {
        SlideRequest::new(
            "Presentera SWOT-analys för styrelsen",
            Audience::Board,
            5,
            RequestedSlideType::Swot,
        )
        .with_details("AI-implementation pågår i tre team")
    }

    fn assembler() -> SlideAssembler {
        SlideAssembler::new().with_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RemoteGenerator for Counting {
        async fn generate(&self, _payload: &GenerationPayload) -> Result<GenerationResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(GatewayError::EmptyDeck)
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    #[tokio::test]
    async fn test_server_error_falls_back_to_local() {
        let app = Router::new().route(
            "/api/generate-slides",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(deck_core::ErrorBody::new("boom"))) }),
        );
        let base = serve(app).await;

        let gateway = GenerationGateway::new(HttpGenerator::new(&base)).with_assembler(assembler());
        let generation = gateway.generate_with_source(&request()).await;

        assert_eq!(generation.source, GenerationSource::Local);
        assert_eq!(generation.slides, assembler().assemble(&request()));
    }

    #[tokio::test]
    async fn test_malformed_body_falls_back_to_local() {
        let app = Router::new().route("/api/generate-slides", post(|| async { "inte json" }));
        let base = serve(app).await;

        let gateway = GenerationGateway::new(HttpGenerator::new(&base)).with_assembler(assembler());
        let slides = gateway.generate(&request()).await;
        assert_eq!(slides, assembler().assemble(&request()));
    }

    #[tokio::test]
    async fn test_unreachable_remote_falls_back_to_local() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let gateway = GenerationGateway::new(HttpGenerator::new(&format!("http://{}", addr)))
            .with_assembler(assembler());
        let generation = gateway.generate_with_source(&request()).await;
        assert_eq!(generation.source, GenerationSource::Local);
    }

    #[tokio::test]
    async fn test_remote_success_is_used() {
        let app = Router::new().route(
            "/api/generate-slides",
            post(|Json(payload): Json<GenerationPayload>| async move {
                Json(GenerationResponse {
                    slides: vec![GeneratedSlide::content(payload.request.purpose.clone(), vec![payload.model])
                        .with_kind(SlideKind::Title)],
                    model: "claude-test".to_string(),
                    success: true,
                })
            }),
        );
        let base = serve(app).await;

        let gateway = GenerationGateway::new(HttpGenerator::new(&base)).with_model("opus");
        let generation = gateway.generate_with_source(&request()).await;

        assert_eq!(
            generation.source,
            GenerationSource::Remote {
                model: "claude-test".to_string()
            }
        );
        assert_eq!(generation.slides.len(), 1);
        assert_eq!(generation.slides[0].title, "Presentera SWOT-analys för styrelsen");
        assert_eq!(generation.slides[0].content, vec!["opus".to_string()]);
    }

    fn oversized_deck(first: SlideKind) -> Router {
        Router::new().route(
            "/api/generate-slides",
            post(move || async move {
                let mut slides: Vec<_> = (1..=12)
                    .map(|n| GeneratedSlide::content(format!("Bild {}", n), vec!["punkt".to_string()]))
                    .collect();
                slides[0] = slides[0].clone().with_kind(first);
                Json(GenerationResponse {
                    slides,
                    model: "claude-test".to_string(),
                    success: true,
                })
            }),
        )
    }

    #[tokio::test]
    async fn test_remote_deck_is_bounded_to_request() {
        let request = SlideRequest::new("Statusrapport", Audience::Colleagues, 3, RequestedSlideType::Agenda);
        let base = serve(oversized_deck(SlideKind::Title)).await;

        let gateway = GenerationGateway::new(HttpGenerator::new(&base)).with_assembler(assembler());
        let generation = gateway.generate_with_source(&request).await;

        assert!(matches!(generation.source, GenerationSource::Remote { .. }));
        let titles: Vec<_> = generation.slides.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Bild 1", "Bild 2", "Bild 3"]);
    }

    #[tokio::test]
    async fn test_remote_deck_without_title_slide_falls_back() {
        let request = SlideRequest::new("Statusrapport", Audience::Colleagues, 3, RequestedSlideType::Agenda);
        let base = serve(oversized_deck(SlideKind::Content)).await;

        let gateway = GenerationGateway::new(HttpGenerator::new(&base)).with_assembler(assembler());
        let generation = gateway.generate_with_source(&request).await;

        assert_eq!(generation.source, GenerationSource::Local);
        assert_eq!(generation.slides, assembler().assemble(&request));
        assert_eq!(generation.slides[0].slide_type, SlideKind::Title);
    }

    #[test]
    fn test_fit_to_request_rejects_blank_titles() {
        let request = SlideRequest::new("Plan", Audience::Board, 5, RequestedSlideType::Custom);
        let slides = vec![
            GeneratedSlide::content("Plan", vec![]).with_kind(SlideKind::Title),
            GeneratedSlide::content("  ", vec!["x".to_string()]),
        ];
        assert!(matches!(fit_to_request(slides, &request), Err(GatewayError::InvalidDeck(_))));
        assert!(matches!(fit_to_request(vec![], &request), Err(GatewayError::EmptyDeck)));
    }

    #[tokio::test]
    async fn test_success_false_and_empty_fall_back() {
        let app = Router::new()
            .route(
                "/api/generate-slides",
                post(|| async {
                    Json(GenerationResponse {
                        slides: vec![GeneratedSlide::content("X", vec![])],
                        model: "m".to_string(),
                        success: false,
                    })
                }),
            );
        let base = serve(app).await;
        let gateway = GenerationGateway::new(HttpGenerator::new(&base)).with_assembler(assembler());
        assert_eq!(gateway.generate_with_source(&request()).await.source, GenerationSource::Local);

        let app = Router::new().route(
            "/api/generate-slides",
            post(|| async {
                Json(GenerationResponse {
                    slides: vec![],
                    model: "m".to_string(),
                    success: true,
                })
            }),
        );
        let base = serve(app).await;
        let gateway = GenerationGateway::new(HttpGenerator::new(&base)).with_assembler(assembler());
        assert_eq!(gateway.generate_with_source(&request()).await.source, GenerationSource::Local);
    }

    #[tokio::test]
    async fn test_exactly_one_attempt() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gateway = GenerationGateway::new(Counting { calls: calls.clone() });
        let slides = gateway.generate(&request()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(slides.len(), 5);
    }

    #[tokio::test]
    async fn test_local_only_skips_remote() {
        let gateway = GenerationGateway::local_only().with_assembler(assembler());
        let generation = gateway.generate_with_source(&request()).await;
        assert_eq!(generation.source, GenerationSource::Local);
        assert_eq!(generation.slides[0].subtitle.as_deref(), Some("För styrelse och ledning - 2024-06-01"));
    }

    #[test]
    fn test_payload_carries_prompt_and_request() {
        let gateway = GenerationGateway::local_only().with_model("sonnet");
        let payload = gateway.payload(&request());
        assert_eq!(payload.model, "sonnet");
        assert_eq!(payload.request, request());
        assert!(payload.prompt.contains("Presentera SWOT-analys för styrelsen"));
    }
}
