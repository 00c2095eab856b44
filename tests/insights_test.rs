use share_harvester::insights::{
    extract_declared_name, fallback_insights, format_conversation, generate_title,
    parse_json_reply, score_sentiment, InsightExtractor,
};
use share_harvester::llm::MockBackend;
use share_harvester::types::{Message, Role, Sentiment};
use std::sync::Arc;

fn sample_conversation() -> Vec<Message> {
    vec![
        Message::new(
            Role::User,
            "my name is Sam, how do I reset a password",
            "modern_selectors",
        ),
        Message::new(
            Role::Assistant,
            "Here is how: open settings and choose reset.",
            "modern_selectors",
        ),
    ]
}

#[test]
fn title_combines_declared_name_and_leading_words() {
    let title = generate_title(&sample_conversation());
    assert_eq!(title, "sam_my_name_is_sam_how");
    assert!(title.len() <= 50);
}

#[test]
fn title_without_user_messages_falls_back_to_timestamp() {
    let messages = vec![Message::new(Role::Assistant, "Hello there", "fallback_pattern")];
    let title = generate_title(&messages);
    assert!(title.starts_with("conversation_"), "got {}", title);
}

#[test]
fn title_is_truncated_and_cleaned() {
    let long = "please explain the extraordinarily complicated multithreaded synchronization primitives";
    let messages = vec![Message::new(Role::User, long, "modern_selectors")];
    let title = generate_title(&messages);
    assert!(title.len() <= 50);
    assert!(title
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_'));
}

#[test]
fn declared_name_patterns_match_in_order() {
    assert_eq!(
        extract_declared_name("Hello, my name is Maria and I code"),
        Some("maria".to_string())
    );
    assert_eq!(extract_declared_name("I'm Kai, hi"), Some("kai".to_string()));
    assert_eq!(extract_declared_name("call me ishmael"), Some("ishmael".to_string()));
    assert_eq!(extract_declared_name("no names here"), None);
}

#[test]
fn sentiment_majority_vote_with_neutral_ties() {
    assert_eq!(score_sentiment("thank you, this was great and helpful"), Sentiment::Positive);
    assert_eq!(score_sentiment("a terrible error caused a bad problem"), Sentiment::Negative);
    assert_eq!(score_sentiment("the sky is blue"), Sentiment::Neutral);
    // One positive word, one negative word.
    assert_eq!(score_sentiment("a good fix for the error"), Sentiment::Neutral);
}

#[tokio::test]
async fn backend_failure_degrades_to_complete_fallback() {
    let extractor = InsightExtractor::new(Arc::new(MockBackend::unavailable()));
    let insight = extractor.extract_insights(&sample_conversation()).await;

    assert_eq!(insight.user_name.as_deref(), Some("sam"));
    assert_eq!(insight.main_topic, "my name is Sam, how");
    assert_eq!(insight.problem_described, "my name is Sam, how do I reset a password");
    assert_eq!(
        insight.solution_provided,
        "Here is how: open settings and choose reset."
    );
    assert_eq!(insight.tags, vec!["conversation", "chat"]);
    assert_eq!(insight.sentiment, Sentiment::Neutral);
}

#[tokio::test]
async fn unparseable_reply_degrades_to_fallback() {
    let extractor = InsightExtractor::new(Arc::new(MockBackend::replying(
        "I could not produce structured output, sorry.",
    )));
    let insight = extractor.extract_insights(&sample_conversation()).await;
    assert_eq!(insight.user_name.as_deref(), Some("sam"));
    assert!(!insight.main_topic.is_empty());
}

#[tokio::test]
async fn json_reply_wrapped_in_prose_is_recovered() {
    let reply = r#"Sure! Here is the analysis you asked for:
{"user_name": "sam", "main_topic": "password resets", "sentiment": "positive", "tags": ["accounts"]}
Hope that helps."#;
    let extractor = InsightExtractor::new(Arc::new(MockBackend::replying(reply)));
    let insight = extractor.extract_insights(&sample_conversation()).await;

    assert_eq!(insight.user_name.as_deref(), Some("sam"));
    assert_eq!(insight.main_topic, "password resets");
    assert_eq!(insight.sentiment, Sentiment::Positive);
    assert_eq!(insight.tags, vec!["accounts"]);
}

#[test]
fn parse_rejects_reply_without_json() {
    assert!(parse_json_reply("no braces at all").is_none());
    assert!(parse_json_reply("mismatched } {").is_none());
}

#[test]
fn fallback_without_messages_is_still_complete() {
    let insight = fallback_insights(&[]);
    assert!(insight.user_name.is_none());
    assert_eq!(insight.main_topic, "General conversation");
    assert_eq!(insight.problem_described, "No problem specified");
    assert_eq!(insight.solution_provided, "No solution provided");
    assert_eq!(insight.sentiment, Sentiment::Neutral);
    assert_eq!(insight.tags.len(), 2);
}

#[test]
fn transcript_formatting_labels_roles() {
    let formatted = format_conversation(&sample_conversation());
    assert!(formatted.starts_with("USER: my name is Sam"));
    assert!(formatted.contains("\n\nASSISTANT: Here is how"));
}
