//! HTTP handlers.

use crate::error::{ApiError, ApiResult};
use crate::llm::generate_slides;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Local, Utc};
use deck_core::feedback::{export_filename, export_json};
use deck_core::{
    FeedbackEntry, FeedbackStats, FeedbackStore, GeneratedSlide, GenerationPayload,
    GenerationResponse,
};
use serde::{Deserialize, Serialize};

/// Model name reported when the local assembler answered.
pub const LOCAL_MODEL: &str = "local-heuristic";

/// Entries shown under "recent feedback".
const RECENT_FEEDBACK: usize = 10;

/// POST /api/generate-slides
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerationPayload>, JsonRejection>,
) -> ApiResult<Json<GenerationResponse>> {
    let Json(payload) = payload?;
    payload.request.validate()?;

    let Some(llm) = state.llm.as_deref() else {
        let slides = state.assembler.assemble(&payload.request);
        log::info!("Generated {} slides locally (requested model {})", slides.len(), payload.model);
        return Ok(Json(GenerationResponse {
            slides,
            model: LOCAL_MODEL.to_string(),
            success: true,
        }));
    };

    let mut slides = generate_slides(llm, &payload.prompt)
        .await
        .map_err(|e| ApiError::Upstream(format!("{:#}", e)))?;
    slides.truncate(payload.request.effective_slide_count());
    log::info!("Generated {} slides with {}", slides.len(), llm.model_name());

    Ok(Json(GenerationResponse {
        slides,
        model: llm.model_name().to_string(),
        success: true,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub slides: Vec<GeneratedSlide>,
}

/// POST /api/export
pub async fn export(
    State(state): State<AppState>,
    body: Result<Json<ExportRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body?;
    if body.slides.is_empty() {
        return Err(ApiError::Unprocessable("no slides to export".to_string()));
    }

    let file = state.exporter.export(&body.slides);
    Ok(attachment(file.content_type(), &file.filename, file.bytes))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSummary {
    #[serde(flatten)]
    pub stats: FeedbackStats,
    pub top_feature: Option<String>,
    /// Newest first.
    pub recent: Vec<FeedbackEntry>,
}

/// POST /api/feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    body: Result<Json<FeedbackEntry>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(mut entry) = body?;
    if entry.rating.is_none() && entry.comment.trim().is_empty() {
        return Err(ApiError::Unprocessable("feedback needs a rating or a comment".to_string()));
    }
    if entry.timestamp == 0 {
        entry.timestamp = Utc::now().timestamp_millis();
    }

    with_store(&state, move |store| store.append(entry)).await?;
    Ok(StatusCode::CREATED)
}

/// GET /api/feedback
pub async fn feedback_summary(State(state): State<AppState>) -> ApiResult<Json<FeedbackSummary>> {
    let entries = with_store(&state, |store| store.entries()).await?;
    let stats = FeedbackStats::from_entries(&entries);
    let top_feature = stats.top_feature().map(|(name, _)| name.to_string());
    let recent = entries.iter().rev().take(RECENT_FEEDBACK).cloned().collect();

    Ok(Json(FeedbackSummary {
        stats,
        top_feature,
        recent,
    }))
}

/// GET /api/feedback/export
pub async fn export_feedback(State(state): State<AppState>) -> ApiResult<Response> {
    let entries = with_store(&state, |store| store.entries()).await?;
    let json = export_json(&entries)?;
    let filename = export_filename(Local::now().date_naive());
    Ok(attachment("application/json", &filename, json.into_bytes()))
}

/// DELETE /api/feedback
pub async fn clear_feedback(State(state): State<AppState>) -> ApiResult<StatusCode> {
    with_store(&state, |store| store.clear()).await?;
    log::info!("Feedback cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// Run a feedback store call on the blocking pool; file-backed stores do
/// synchronous I/O.
async fn with_store<T, F>(state: &AppState, call: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn FeedbackStore) -> deck_core::Result<T> + Send + 'static,
{
    let store = state.feedback.clone();
    let result = tokio::task::spawn_blocking(move || call(store.as_ref()))
        .await
        .map_err(|e| ApiError::Internal(format!("Feedback store task failed: {}", e)))?;
    Ok(result?)
}

fn attachment(content_type: &'static str, filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        bytes,
    )
        .into_response()
}
