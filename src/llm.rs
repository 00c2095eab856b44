use crate::types::{HarvestError, LlmConfig, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Capability seam for the external summarization runtime.
///
/// All lifecycle concerns of the model runtime (install, start, pull,
/// preload) belong to whatever collaborator constructs the backend; the
/// pipeline only ever sees `complete` and a not-ready error.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Submit a system instruction plus user prompt, get free-form text
    /// back. The reply may or may not be valid JSON.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: ChatResponseMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

/// Chat backend speaking the local Ollama-style HTTP API.
pub struct OllamaBackend {
    client: Client,
    config: LlmConfig,
}

impl OllamaBackend {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl CompletionBackend for OllamaBackend {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        if self.config.model.is_empty() {
            return Err(HarvestError::LlmNotReady);
        }

        let payload = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
        };

        debug!("Submitting completion request to {}", self.config.base_url);
        let response = self
            .client
            .post(&self.config.base_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::LlmStatus(status.as_u16()));
        }

        let data: ChatResponse = response.json().await?;
        Ok(data.message.content)
    }
}

/// Canned backend for tests and offline development, in the spirit of the
/// HTTP one but without a runtime behind it.
pub struct MockBackend {
    reply: Option<String>,
}

impl MockBackend {
    /// Backend that always answers with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
        }
    }

    /// Backend that always fails as not ready.
    pub fn unavailable() -> Self {
        Self { reply: None }
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(HarvestError::LlmNotReady),
        }
    }
}
