//! JSON bodies of the slide generation endpoint.

use crate::types::{GeneratedSlide, SlideRequest};
use serde::{Deserialize, Serialize};

/// Model name sent by clients asking for the best available generator.
pub const DEFAULT_REMOTE_MODEL: &str = "opus";

/// Body of `POST /api/generate-slides`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationPayload {
    pub prompt: String,
    pub model: String,
    pub request: SlideRequest,
}

/// Successful answer of `POST /api/generate-slides`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub slides: Vec<GeneratedSlide>,
    pub model: String,
    #[serde(default)]
    pub success: bool,
}

/// Body returned with any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
