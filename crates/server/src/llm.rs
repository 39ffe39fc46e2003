//! Upstream language model used by the generation endpoint.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use deck_core::GeneratedSlide;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 8192;

const SYSTEM_PROMPT: &str = "Du skapar presentationer för en konsultfirma. \
Svara endast med giltig JSON, utan markdown-block och utan förklaringar.";

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one prompt and return the reply text.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

/// Anthropic messages API client.
#[derive(Clone)]
pub struct AnthropicClient {
    api_key: String,
    client: reqwest::Client,
    model: String,
    timeout: Option<Duration>,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::Client::new(),
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let mut request = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&serde_json::json!({
                "model": &self.model,
                "max_tokens": MAX_TOKENS,
                "system": system_prompt,
                "messages": [{"role": "user", "content": user_prompt}]
            }));
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.context("Anthropic request failed")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Anthropic API error {}: {}", status, body));
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            text: Option<String>,
        }
        #[derive(Deserialize)]
        struct ApiResponse {
            content: Vec<ContentBlock>,
        }

        let api_response: ApiResponse = response.json().await?;
        api_response
            .content
            .into_iter()
            .find_map(|c| c.text)
            .ok_or_else(|| anyhow!("Empty response from Anthropic"))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient").field("model", &self.model).finish()
    }
}

/// Ask `llm` for slides.
pub async fn generate_slides(llm: &dyn LlmClient, prompt: &str) -> Result<Vec<GeneratedSlide>> {
    let reply = llm.complete(SYSTEM_PROMPT, prompt).await?;
    parse_slides(&reply)
}

/// Pull `{"slides": [...]}` out of a model reply.
///
/// Tolerates code fences and prose around the JSON object.
pub fn parse_slides(reply: &str) -> Result<Vec<GeneratedSlide>> {
    #[derive(Deserialize)]
    struct Envelope {
        slides: Vec<GeneratedSlide>,
    }

    let start = reply.find('{').ok_or_else(|| anyhow!("No JSON object in model reply"))?;
    let end = reply.rfind('}').ok_or_else(|| anyhow!("No JSON object in model reply"))?;
    if end < start {
        return Err(anyhow!("No JSON object in model reply"));
    }

    let envelope: Envelope =
        serde_json::from_str(&reply[start..=end]).context("Model reply is not a slide list")?;
    if envelope.slides.is_empty() {
        return Err(anyhow!("Model returned no slides"));
    }
    Ok(envelope.slides)
}
