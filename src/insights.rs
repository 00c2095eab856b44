//! Title and insight generation over extracted transcripts.
//!
//! Insight extraction is LLM-first with a deterministic local fallback:
//! whatever goes wrong on the backend path (transport, status, timeout,
//! unparseable reply), the caller always receives a structurally complete
//! [`Insight`], so persistence never has to special-case a partial one.

use crate::llm::CompletionBackend;
use crate::types::{Insight, Message, Role, Sentiment};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

const NAME_PATTERNS: [&str; 4] = ["my name is ", "i'm ", "i am ", "call me "];

const POSITIVE_WORDS: [&str; 6] = ["good", "great", "excellent", "thank", "helpful", "amazing"];
const NEGATIVE_WORDS: [&str; 6] = ["bad", "terrible", "awful", "problem", "issue", "error"];

const ANALYST_SYSTEM_PROMPT: &str = "You are a conversation analyst that returns only valid JSON.";

const TITLE_MAX_LEN: usize = 50;
const TITLE_WORD_COUNT: usize = 5;

/// Derive a short filesystem-friendly title from the first user message.
/// Deterministic given the same messages; the current time is only used on
/// the no-user-message path.
pub fn generate_title(messages: &[Message]) -> String {
    let first_user = match messages.iter().find(|m| m.role == Role::User) {
        Some(msg) => &msg.content,
        None => return timestamp_title(),
    };

    let user_name = extract_declared_name(first_user).unwrap_or_else(|| "user".to_string());

    let summary: Vec<String> = first_user
        .split_whitespace()
        .take(TITLE_WORD_COUNT)
        .filter_map(|word| {
            let cleaned: String = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if cleaned.is_empty() || !cleaned.chars().all(char::is_alphanumeric) {
                None
            } else {
                Some(cleaned)
            }
        })
        .collect();

    let title: String = format!("{}_{}", user_name, summary.join("_"))
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .take(TITLE_MAX_LEN)
        .collect();

    if title.is_empty() {
        timestamp_title()
    } else {
        title
    }
}

fn timestamp_title() -> String {
    format!("conversation_{}", Utc::now().format("%Y%m%d_%H%M%S"))
}

/// First declared name in the text ("my name is X", "I'm X", ...),
/// lower-cased. Pattern order is fixed, first match wins.
pub fn extract_declared_name(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    for pattern in NAME_PATTERNS {
        if let Some(idx) = lower.find(pattern) {
            let name: String = lower[idx + pattern.len()..]
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            if !name.is_empty() {
                return Some(name);
            }
        }
    }
    None
}

/// Majority vote over fixed positive and negative word tables; ties are
/// neutral. Presence counts, not occurrences.
pub fn score_sentiment(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let positive = POSITIVE_WORDS.iter().filter(|w| lower.contains(**w)).count();
    let negative = NEGATIVE_WORDS.iter().filter(|w| lower.contains(**w)).count();

    if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Generates structured insights from a transcript via the completion
/// backend, degrading to [`fallback_insights`] on any failure.
pub struct InsightExtractor {
    backend: Arc<dyn CompletionBackend>,
}

impl InsightExtractor {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub async fn extract_insights(&self, messages: &[Message]) -> Insight {
        let conversation_text = format_conversation(messages);
        let prompt = build_analysis_prompt(&conversation_text);

        match self.backend.complete(ANALYST_SYSTEM_PROMPT, &prompt).await {
            Ok(reply) => match parse_json_reply(&reply) {
                Some(insight) => {
                    info!("Successfully extracted insights using LLM");
                    insight
                }
                None => {
                    warn!("Failed to parse LLM reply, using fallback insights");
                    fallback_insights(messages)
                }
            },
            Err(e) => {
                error!("Error extracting insights: {}", e);
                fallback_insights(messages)
            }
        }
    }
}

/// Transcript as alternating `ROLE: content` turns for the analysis prompt.
pub fn format_conversation(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|msg| {
            let role = match msg.role {
                Role::User => "USER",
                Role::Assistant => "ASSISTANT",
                Role::Unknown => "UNKNOWN",
            };
            format!("{}: {}", role, msg.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn build_analysis_prompt(conversation_text: &str) -> String {
    format!(
        r#"Analyze the following conversation and extract structured insights in JSON format.

Conversation:
{conversation_text}

Extract the following information and return as valid JSON:
{{
    "user_name": "extracted name or null",
    "user_background": "brief description of user background/context",
    "main_topic": "primary topic discussed",
    "problem_described": "main problem or question raised",
    "solution_provided": "key solution or advice given",
    "tags": ["tag1", "tag2", "tag3"],
    "sentiment": "positive/neutral/negative",
    "created_at": "{now}"
}}

Return ONLY valid JSON, no other text."#,
        now = Utc::now().to_rfc3339(),
    )
}

/// Parse an LLM reply that should be JSON but may be wrapped in prose:
/// direct parse first, then the first brace-delimited substring.
pub fn parse_json_reply(content: &str) -> Option<Insight> {
    if let Ok(insight) = serde_json::from_str::<Insight>(content) {
        return Some(insight);
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Insight>(&content[start..=end]).ok()
}

/// Deterministic local insight computation used whenever the backend path
/// fails; always produces a complete value.
pub fn fallback_insights(messages: &[Message]) -> Insight {
    info!("Generating fallback insights");

    let user_messages: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .collect();
    let assistant_messages: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .map(|m| m.content.as_str())
        .collect();

    let user_name = user_messages.first().and_then(|msg| extract_declared_name(msg));

    let main_topic = user_messages
        .first()
        .map(|msg| {
            msg.split_whitespace()
                .take(TITLE_WORD_COUNT)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_else(|| "General conversation".to_string());

    let all_text = messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Insight {
        user_name,
        user_background: "Not specified".to_string(),
        main_topic,
        problem_described: user_messages
            .first()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "No problem specified".to_string()),
        solution_provided: assistant_messages
            .first()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "No solution provided".to_string()),
        tags: vec!["conversation".to_string(), "chat".to_string()],
        sentiment: score_sentiment(&all_text),
        created_at: Utc::now(),
    }
}
