// Groq chat-completions client (OpenAI-compatible wire format)

use std::time::Duration;

use autosales_config::LlmConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("prompt is {len} characters, limit is {max}")]
    PromptTooLong { len: usize, max: usize },
    #[error("no API key configured")]
    MissingCredential,
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("provider error ({status}): {message}")]
    Provider { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Rejected before any network activity.
    pub fn is_prompt_rejection(&self) -> bool {
        matches!(self, LlmError::EmptyPrompt | LlmError::PromptTooLong { .. })
    }
}

/// Transport seam for the verified client.
pub trait ChatBackend {
    fn model_id(&self) -> &str;
    fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ProviderError {
    error: ProviderErrorDetail,
}

#[derive(Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

// ============================================================================
// Client
// ============================================================================

pub struct GroqClient {
    config: LlmConfig,
    http: reqwest::blocking::Client,
}

impl GroqClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("autosales/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint)
    }
}

impl ChatBackend for GroqClient {
    fn model_id(&self) -> &str {
        &self.config.model
    }

    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        if self.config.api_key.trim().is_empty() {
            return Err(LlmError::MissingCredential);
        }

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        log::debug!(
            "POST {} model={} prompt_chars={}",
            self.url(),
            self.config.model,
            prompt.chars().count()
        );

        let response = self
            .http
            .post(self.url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .map_err(|e| transport_error(e, self.config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = match serde_json::from_str::<ProviderError>(&body) {
                Ok(err) => err.error.message,
                Err(_) if body.trim().is_empty() => status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
                Err(_) => body,
            };
            return Err(LlmError::Provider { status: status.as_u16(), message });
        }

        let body = response
            .text()
            .map_err(|e| transport_error(e, self.config.timeout))?;
        extract_content(&body)
    }
}

fn transport_error(e: reqwest::Error, timeout: Duration) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout(format!("no response within {}s", timeout.as_secs_f32()))
    } else {
        LlmError::Network(e.to_string())
    }
}

/// First choice's message text. Blank content counts as no content.
fn extract_content(body: &str) -> Result<String, LlmError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| LlmError::InvalidResponse("no content in response".to_string()))
}
