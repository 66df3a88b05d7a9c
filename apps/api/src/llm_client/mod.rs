//! LLM Client — the single point of entry for every OpenRouter call.
//!
//! No other module may talk to the provider directly. Handlers and the critique
//! pipeline only see the `CompletionProvider` trait, which `AppState` carries as
//! `Arc<dyn CompletionProvider>`.
//!
//! One attempt per call. Retrying is the user's job (re-submit the document).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Credentials;

#[cfg(test)]
pub mod mock;

const LIST_MODELS_PATH: &str = "/models";
const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 1000;
/// Upper bound on the out-of-band connectivity probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// True when the provider rejected the credential: a 401 status, or a provider
    /// message that mentions `401` / `Unauthorized`. Transport errors only count by
    /// status, since their text carries the request URL.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            LlmError::Api { status, message } => {
                *status == 401 || message.contains("401") || message.contains("Unauthorized")
            }
            LlmError::Http(e) => e.status().map(|s| s.as_u16()) == Some(401),
            LlmError::Parse(_) | LlmError::EmptyContent => false,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub provider: ProviderPreferences,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// OpenRouter routing hint: let the provider swap in another backend when the
/// requested one is down.
#[derive(Debug, Serialize)]
pub struct ProviderPreferences {
    pub allow_fallbacks: bool,
}

impl<'a> ChatCompletionRequest<'a> {
    pub fn new(model: &'a str, system: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            provider: ProviderPreferences {
                allow_fallbacks: true,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
    /// OpenRouter occasionally reports upstream failures inside a 200 response.
    #[serde(default)]
    pub error: Option<ProviderErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if the model produced any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ProviderErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

/// Raw outcome of a direct call to the model-listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub status_code: u16,
    pub body: ProbeBody,
}

/// The listing body as JSON when it parses, otherwise the raw text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProbeBody {
    Json(serde_json::Value),
    Text(String),
}

impl ProbeBody {
    pub fn from_text(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => ProbeBody::Json(value),
            Err(_) => ProbeBody::Text(text),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Everything the critique pipeline and the diagnostics endpoints need from the
/// provider. Implement this to swap the backend (or record calls in tests).
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Model identifier sent with every completion request.
    fn model(&self) -> &str;

    /// Lightweight credential-liveness check against the listing endpoint.
    async fn list_models(&self) -> Result<(), LlmError>;

    /// One chat completion: system message then user prompt. Returns the first
    /// choice's text.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    /// Direct listing call that surfaces status and body whatever the status is.
    async fn probe(&self) -> Result<ProbeReport, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// OpenRouterClient
// ────────────────────────────────────────────────────────────────────────────

/// reqwest-backed `CompletionProvider` talking to the OpenRouter v1 API.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl OpenRouterClient {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches the bearer token and the attribution headers OpenRouter expects.
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.credentials.api_key)
            .header("HTTP-Referer", &self.credentials.site_url)
            .header("X-Title", &self.credentials.app_name)
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterClient {
    fn model(&self) -> &str {
        &self.credentials.model
    }

    async fn list_models(&self) -> Result<(), LlmError> {
        let response = self
            .authorized(self.client.get(self.url(LIST_MODELS_PATH)))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Model listing returned {}", status);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: provider_message(body),
            });
        }

        debug!("Model listing succeeded");
        Ok(())
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let request_body = ChatCompletionRequest::new(&self.credentials.model, system, prompt);

        let response = self
            .authorized(self.client.post(self.url(CHAT_COMPLETIONS_PATH)))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Chat completion returned {}: {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: provider_message(body),
            });
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&response.text().await?)?;
        into_text(completion, status.as_u16())
    }

    async fn probe(&self) -> Result<ProbeReport, LlmError> {
        let response = self
            .authorized(self.client.get(self.url(LIST_MODELS_PATH)))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await?;

        let status_code = response.status().as_u16();
        let text = response.text().await?;
        debug!(status_code, "Connectivity probe completed");

        Ok(ProbeReport {
            status_code,
            body: ProbeBody::from_text(text),
        })
    }
}

/// Pulls the critique text out of a successful HTTP response, surfacing any
/// embedded provider error instead.
fn into_text(completion: ChatCompletionResponse, http_status: u16) -> Result<String, LlmError> {
    if let Some(usage) = &completion.usage {
        debug!(
            "Chat completion succeeded: model={:?}, prompt_tokens={}, completion_tokens={}",
            completion.model, usage.prompt_tokens, usage.completion_tokens
        );
    }

    if let Some(text) = completion.text() {
        return Ok(text.to_string());
    }

    match completion.error {
        Some(err) => Err(LlmError::Api {
            status: err
                .code
                .as_ref()
                .and_then(|c| c.as_u64())
                .and_then(|c| u16::try_from(c).ok())
                .unwrap_or(http_status),
            message: err.message,
        }),
        None => Err(LlmError::EmptyContent),
    }
}

/// Unwraps `{"error": {"message": ...}}` bodies; falls back to the raw body.
fn provider_message(body: String) -> String {
    serde_json::from_str::<ProviderError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}
