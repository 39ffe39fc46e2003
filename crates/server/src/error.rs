use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use deck_core::ErrorBody;
use thiserror::Error;

/// Errors a handler can answer with. Every one is sent as `{"error": ...}`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Body was not the JSON we expected.
    #[error("Malformed request body: {0}")]
    BadRequest(String),

    /// Body parsed but its values are out of range.
    #[error("{0}")]
    Unprocessable(String),

    #[error("Upstream generation failed: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<deck_core::Error> for ApiError {
    fn from(err: deck_core::Error) -> Self {
        match err {
            deck_core::Error::InvalidRequest(msg) => ApiError::Unprocessable(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::warn!("{} {}", status, self);
        } else {
            log::debug!("{} {}", status, self);
        }
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
