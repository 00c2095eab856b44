//! Role classification for extracted conversation turns.
//!
//! The cascade runs from the strongest signal (avatar markers) down to a
//! keyword heuristic over the turn's own text, and returns [`Role::Unknown`]
//! when nothing fires. The keyword scoring is deliberately a standalone pure
//! function so it can be tested without any DOM in hand.

use crate::extractor::collect_text;
use crate::types::Role;
use scraper::{ElementRef, Selector};

const USER_AVATAR_SELECTORS: [&str; 7] = [
    r#"img[alt*="User"]"#,
    r#"img[alt*="user"]"#,
    r#"img[src*="user"]"#,
    r#"[aria-label*="User"]"#,
    r#"[aria-label*="user"]"#,
    r#"[data-testid*="user"]"#,
    ".user-avatar",
];

const ASSISTANT_AVATAR_SELECTORS: [&str; 9] = [
    r#"img[alt*="ChatGPT"]"#,
    r#"img[alt*="Assistant"]"#,
    r#"img[alt*="assistant"]"#,
    r#"img[src*="chatgpt"]"#,
    r#"img[src*="openai"]"#,
    r#"[aria-label*="ChatGPT"]"#,
    r#"[aria-label*="Assistant"]"#,
    r#"[data-testid*="assistant"]"#,
    ".assistant-avatar",
];

const USER_ATTR_HINTS: [&str; 2] = ["user", "human"];
const ASSISTANT_ATTR_HINTS: [&str; 4] = ["assistant", "ai", "chatgpt", "bot"];

const USER_PHRASES: [&str; 9] = [
    "please", "can you", "how do i", "what is", "help me", "i want", "i need", "could you",
    "would you",
];

const ASSISTANT_PHRASES: [&str; 8] = [
    "i can help",
    "here is",
    "here are",
    "to answer",
    "certainly",
    "of course",
    "i understand",
    "let me",
];

/// Determine the author of a message container. First matching signal wins;
/// avatar markers take precedence over attribute hints, which take
/// precedence over content keywords.
pub fn classify_container(container: &ElementRef) -> Role {
    for selector in USER_AVATAR_SELECTORS {
        if matches_selector(container, selector) {
            return Role::User;
        }
    }
    for selector in ASSISTANT_AVATAR_SELECTORS {
        if matches_selector(container, selector) {
            return Role::Assistant;
        }
    }

    let mut attrs = container.value().attr("class").unwrap_or("").to_string();
    attrs.push_str(container.value().attr("data-testid").unwrap_or(""));
    let attrs = attrs.to_lowercase();
    if USER_ATTR_HINTS.iter().any(|hint| attrs.contains(hint)) {
        return Role::User;
    }
    if ASSISTANT_ATTR_HINTS.iter().any(|hint| attrs.contains(hint)) {
        return Role::Assistant;
    }

    let content = collect_text(container);
    let trimmed = content.trim();
    if !trimmed.is_empty() {
        if let Some(role) = keyword_signal(trimmed) {
            return role;
        }
    }

    // No decisive signal anywhere in the cascade. A container has no
    // meaningful position in an alternating sequence, so there is no parity
    // to fall back on here.
    Role::Unknown
}

/// Keyword heuristic over raw text: whichever phrase table scores higher
/// wins, ties fall back to position parity (even index reads as the user
/// side of an alternating conversation). Best-effort by construction.
pub fn score_role(content: &str, position: usize) -> Role {
    match keyword_signal(content) {
        Some(role) => role,
        None if position % 2 == 0 => Role::User,
        None => Role::Assistant,
    }
}

/// `Some(role)` when the phrase tables disagree in one direction; `None`
/// on scoreless or tied text.
fn keyword_signal(content: &str) -> Option<Role> {
    let content_lower = content.to_lowercase();

    let user_score = USER_PHRASES
        .iter()
        .filter(|phrase| content_lower.contains(**phrase))
        .count();
    let assistant_score = ASSISTANT_PHRASES
        .iter()
        .filter(|phrase| content_lower.contains(**phrase))
        .count();

    if user_score > assistant_score {
        Some(Role::User)
    } else if assistant_score > user_score {
        Some(Role::Assistant)
    } else {
        None
    }
}

fn matches_selector(container: &ElementRef, selector: &str) -> bool {
    match Selector::parse(selector) {
        Ok(sel) => container.select(&sel).next().is_some(),
        Err(_) => false,
    }
}
