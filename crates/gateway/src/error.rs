use thiserror::Error;

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Reasons a remote generation attempt produced no usable deck.
///
/// The gateway treats every variant the same way (local fallback); the
/// distinction only matters for logs.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Remote reported failure: {0}")]
    Rejected(String),

    #[error("Remote returned no slides")]
    EmptyDeck,

    #[error("Remote deck does not fit the request: {0}")]
    InvalidDeck(String),
}
