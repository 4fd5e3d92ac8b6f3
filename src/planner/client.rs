//! Clients for the remote text-generation backend.
//!
//! Both backends sit behind [`TextGenerator`], so swapping the hosted API
//! never touches prompt building or sanitizing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::{LlmBackend, LlmConfig};

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    /// Only the text-generation backend understands this one.
    pub repetition_penalty: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("transport failure: {message}")]
    Transport {
        message: String,
        status: Option<u16>,
    },
    #[error("unexpected response format: {0}")]
    MalformedResponse(String),
    #[error("upstream error: {0}")]
    Upstream(String),
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn backend(&self) -> &'static str;

    /// One request, one response. No retries, no streaming.
    async fn generate(
        &self,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, GenerationError>;
}

/// Builds the client selected by `LLM_BACKEND`.
pub fn from_config(cfg: &LlmConfig) -> anyhow::Result<Arc<dyn TextGenerator>> {
    let generator: Arc<dyn TextGenerator> = match cfg.backend {
        LlmBackend::Chat => Arc::new(ChatCompletionClient::new(cfg)?),
        LlmBackend::Text => Arc::new(TextGenerationClient::new(cfg)?),
    };
    info!(
        backend = generator.backend(),
        url = %cfg.api_url,
        model = %cfg.model,
        "generation client ready"
    );
    Ok(generator)
}

fn http_client(cfg: &LlmConfig) -> anyhow::Result<Client> {
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()?;
    Ok(client)
}

// ---- chat completion ----

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Hosted chat-completion API (`{model, messages, ...}` → `choices[0].message.content`).
pub struct ChatCompletionClient {
    client: Client,
    url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionClient {
    pub fn new(cfg: &LlmConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client(cfg)?,
            url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionClient {
    fn backend(&self) -> &'static str {
        "chat"
    }

    #[instrument(skip(self, prompt, params), fields(prompt_len = prompt.len()))]
    async fn generate(
        &self,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(transport)?;
        debug!(%status, elapsed = ?started.elapsed(), "chat completion response");

        let value = decode_body(status, &bytes)?;
        let content = value
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                GenerationError::MalformedResponse("missing choices[0].message.content".into())
            })?;

        info!(chars = content.len(), elapsed = ?started.elapsed(), "generated");
        Ok(content.to_string())
    }
}

// ---- text generation ----

#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    inputs: &'a str,
    parameters: TextParameters,
}

#[derive(Debug, Serialize)]
struct TextParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
    do_sample: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    repetition_penalty: Option<f32>,
    return_full_text: bool,
}

/// Hosted text-generation inference API (`{inputs, parameters}` → `[{generated_text}]`).
pub struct TextGenerationClient {
    client: Client,
    url: String,
    api_key: String,
}

impl TextGenerationClient {
    pub fn new(cfg: &LlmConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client(cfg)?,
            url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for TextGenerationClient {
    fn backend(&self) -> &'static str {
        "text"
    }

    #[instrument(skip(self, prompt, params), fields(prompt_len = prompt.len()))]
    async fn generate(
        &self,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, GenerationError> {
        let body = TextRequest {
            inputs: prompt,
            parameters: TextParameters {
                max_new_tokens: params.max_tokens,
                temperature: params.temperature,
                top_p: params.top_p,
                do_sample: true,
                repetition_penalty: params.repetition_penalty,
                return_full_text: false,
            },
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(transport)?;
        debug!(%status, elapsed = ?started.elapsed(), "text generation response");

        let value = decode_body(status, &bytes)?;
        let first = match &value {
            Value::Array(items) => items.first(),
            obj @ Value::Object(_) => Some(obj),
            _ => None,
        };
        let text = first
            .and_then(|v| v.get("generated_text"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                GenerationError::MalformedResponse("missing generated_text".into())
            })?;

        // Some deployments ignore return_full_text and echo the prompt.
        let text = text.strip_prefix(prompt).unwrap_or(text).trim();
        info!(chars = text.len(), elapsed = ?started.elapsed(), "generated");
        Ok(text.to_string())
    }
}

// ---- shared response handling ----

fn transport(e: reqwest::Error) -> GenerationError {
    warn!(error = %e, "generation request failed");
    GenerationError::Transport {
        message: e.to_string(),
        status: e.status().map(|s| s.as_u16()),
    }
}

/// Parses the body and turns an `error` field or a failing status into an error.
fn decode_body(status: StatusCode, bytes: &Bytes) -> Result<Value, GenerationError> {
    let parsed = serde_json::from_slice::<Value>(bytes);

    if let Ok(value) = &parsed {
        if let Some(message) = upstream_message(value) {
            warn!(%status, error = %message, "backend returned an error");
            return Err(GenerationError::Upstream(message));
        }
    }

    if !status.is_success() {
        let snippet: String = String::from_utf8_lossy(bytes).chars().take(200).collect();
        warn!(%status, body = %snippet, "backend returned a failing status");
        return Err(GenerationError::Transport {
            message: format!("HTTP {status}: {snippet}"),
            status: Some(status.as_u16()),
        });
    }

    parsed.map_err(|e| GenerationError::MalformedResponse(format!("invalid JSON: {e}")))
}

/// `{"error": "..."}` or `{"error": {"message": "..."}}`.
fn upstream_message(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(
            other
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
        ),
    }
}
