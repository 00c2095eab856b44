use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a single conversation turn.
///
/// `Unknown` is a real third state: the classifier cascade found no signal.
/// It is preserved downstream rather than forced into a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub extraction_method: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, method: &str) -> Self {
        Self {
            role,
            content: content.into(),
            extraction_method: method.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMetadata {
    pub total_messages: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub extraction_method: String,
}

/// An ordered, role-tagged conversation extracted from one share page.
/// Built only through [`Transcript::new`] so the metadata counts can never
/// drift from the message list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub url: String,
    pub messages: Vec<Message>,
    pub metadata: TranscriptMetadata,
}

impl Transcript {
    pub fn new(url: String, messages: Vec<Message>) -> Self {
        let user_messages = messages.iter().filter(|m| m.role == Role::User).count();
        let assistant_messages = messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .count();
        let extraction_method = messages
            .first()
            .map(|m| m.extraction_method.clone())
            .unwrap_or_default();
        let metadata = TranscriptMetadata {
            total_messages: messages.len(),
            user_messages,
            assistant_messages,
            extraction_method,
        };
        Self {
            url,
            messages,
            metadata,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Default for Sentiment {
    fn default() -> Self {
        Sentiment::Neutral
    }
}

/// Structured summary derived from one transcript.
///
/// Fields default individually so a partially-shaped LLM reply still
/// deserializes where possible; the local fallback always fills every field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_background: String,
    #[serde(default)]
    pub main_topic: String,
    #[serde(default)]
    pub problem_described: String,
    #[serde(default)]
    pub solution_provided: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Outcome of one successful pipeline run, handed back to the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub url: String,
    pub conversation_file: String,
    pub insights_file: Option<String>,
    pub message_count: usize,
    pub title: String,
}

/// Summary row for the insight listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightSummary {
    pub filename: String,
    pub user_name: Option<String>,
    pub main_topic: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_redirects: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            timeout_seconds: 15,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Delay applied after the page load before the document is queried,
    /// mirroring the settle wait a DOM-rendering engine would perform.
    pub settle_delay_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            timeout_seconds: 30,
            settle_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/api/chat".to_string(),
            model: "llama3".to_string(),
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub conversations_dir: String,
    pub insights_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            conversations_dir: "valid_jsons".to_string(),
            insights_dir: "insights_json".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub batch_size: usize,
    pub max_concurrency: usize,
    pub batch_interval_seconds: u64,
    pub failure_threshold: u32,
    pub cooldown_seconds: u64,
    pub recovery_seconds: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            max_concurrency: 3,
            batch_interval_seconds: 15,
            failure_threshold: 3,
            cooldown_seconds: 30,
            recovery_seconds: 10,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Completion backend is not ready")]
    LlmNotReady,

    #[error("Completion backend returned status {0}")]
    LlmStatus(u16),

    #[error("Summarization error: {0}")]
    Summarization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, HarvestError>;
