//! Remote slide generators.

use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use deck_core::{ErrorBody, GenerationPayload, GenerationResponse};
use std::time::Duration;

/// Path of the generation endpoint under a service base URL.
pub const GENERATE_PATH: &str = "/api/generate-slides";

/// Something that can turn a generation payload into slides.
#[async_trait]
pub trait RemoteGenerator: Send + Sync {
    /// One attempt, no retries.
    async fn generate(&self, payload: &GenerationPayload) -> Result<GenerationResponse>;

    /// Where requests go, for logs.
    fn describe(&self) -> String;
}

/// Posts payloads to `<base>/api/generate-slides`.
#[derive(Debug, Clone)]
pub struct HttpGenerator {
    client: reqwest::Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl HttpGenerator {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), GENERATE_PATH),
            timeout: None,
        }
    }

    /// Abort the request after `timeout`. Unset means wait indefinitely.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteGenerator for HttpGenerator {
    async fn generate(&self, payload: &GenerationPayload) -> Result<GenerationResponse> {
        let mut request = self.client.post(&self.endpoint).json(payload);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: message,
            });
        }

        let parsed: GenerationResponse = serde_json::from_slice(&body)?;
        if !parsed.success {
            return Err(GatewayError::Rejected(format!("success=false from model {}", parsed.model)));
        }
        if parsed.slides.is_empty() {
            return Err(GatewayError::EmptyDeck);
        }
        Ok(parsed)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}
