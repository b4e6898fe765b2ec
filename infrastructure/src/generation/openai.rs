//! OpenAI-compatible chat completions adapter.
//!
//! Works against any server exposing `POST {base_url}/chat/completions`
//! (OpenAI, OpenRouter, Ollama, vLLM, ...). Each generation request becomes
//! one chat: the domain persona as system message, the dialogue context as
//! prior user/assistant messages, then the prompt.

use crate::config::FileGenerationConfig;
use async_trait::async_trait;
use ideaforge_application::ports::text_generator::{
    GenerationError, GenerationRequest, TextGenerator,
};
use ideaforge_domain::core::string::truncate;
use ideaforge_domain::{Speaker, Turn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Longest error body echoed back to the caller
const ERROR_BODY_LIMIT: usize = 300;

/// Markers servers use when a request trips a content policy
const POLICY_MARKERS: [&str; 3] = ["content_filter", "content_policy", "content policy"];

#[derive(Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub model: String,
    /// Sent as a bearer token when present; local servers often need none
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_deref().map(mask_api_key))
            .field("timeout", &self.timeout)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key: None,
            timeout: Duration::from_secs(60),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Build from the `[generation]` section, reading the key from its
    /// configured environment variable
    pub fn from_file_config(config: &FileGenerationConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key(),
            timeout: Duration::from_secs(config.timeout_seconds),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Mask all but the ends of an API key
fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl ChatMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }

    /// Agent turns become assistant messages labelled with their domain
    fn from_turn(turn: &Turn) -> Self {
        match turn.speaker {
            Speaker::User => Self::user(turn.text.clone()),
            Speaker::Agent => Self {
                role: "assistant",
                content: format!("[{}] {}", turn.label(), turn.text),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

fn build_messages(request: &GenerationRequest) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(request.context.len() + 2);
    messages.push(ChatMessage::system(request.system_prompt.clone()));
    messages.extend(request.context.iter().map(ChatMessage::from_turn));
    messages.push(ChatMessage::user(request.prompt.clone()));
    messages
}

fn is_policy_rejection(body: &str) -> bool {
    let lower = body.to_lowercase();
    POLICY_MARKERS.iter().any(|m| lower.contains(m))
}

/// Map a non-success HTTP status to a generation error
fn error_for_status(status: StatusCode, body: &str) -> GenerationError {
    if is_policy_rejection(body) {
        return GenerationError::Rejected(truncate(body.trim(), ERROR_BODY_LIMIT));
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Unavailable(
            "authentication failed; check the API key environment variable".to_string(),
        ),
        StatusCode::TOO_MANY_REQUESTS => {
            GenerationError::Unavailable("rate limit exceeded".to_string())
        }
        _ => GenerationError::Unavailable(format!(
            "HTTP {}: {}",
            status.as_u16(),
            truncate(body.trim(), ERROR_BODY_LIMIT)
        )),
    }
}

/// Text of the first choice, or why there is none
fn extract_text(response: ChatResponse) -> Result<String, GenerationError> {
    let Some(choice) = response.choices.into_iter().next() else {
        return Err(GenerationError::Unavailable(
            "response contained no choices".to_string(),
        ));
    };

    if let Some(refusal) = choice.message.refusal {
        return Err(GenerationError::Rejected(refusal));
    }
    if choice.finish_reason.as_deref() == Some("content_filter") {
        return Err(GenerationError::Rejected(
            "response withheld by content filter".to_string(),
        ));
    }

    match choice.message.content {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(GenerationError::Unavailable("empty response".to_string())),
    }
}

// ============================================================================
// Generator
// ============================================================================

pub struct OpenAiCompatibleGenerator {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiCompatibleGenerator {
    pub fn new(config: OpenAiConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Unavailable(format!("HTTP client setup failed: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: build_messages(request),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!(
            model = %self.config.model,
            messages = body.messages.len(),
            "Sending chat completion"
        );

        let mut http = self.client.post(self.config.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            http = http.bearer_auth(key);
        }

        let response = http.send().await.map_err(|e| {
            warn!("Chat completion request failed: {}", e);
            if e.is_timeout() {
                GenerationError::Unavailable("request timed out".to_string())
            } else {
                GenerationError::Unavailable(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, &text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Unavailable(format!("malformed response: {e}")))?;
        extract_text(parsed)
    }
}
