//! Multi-strategy conversation extraction.
//!
//! A rendered share page is run through a fixed, ordered chain of
//! strategies, from precise layout selectors down to a whole-page pattern
//! split. The first strategy whose output is structurally valid (at least
//! one user and one assistant message) wins; its output is then scrubbed of
//! error-banner text. Strategy order, not strategy correctness, governs the
//! final shape — later strategies trade precision for robustness against
//! markup drift.

use crate::render::RenderedPage;
use crate::roles::{classify_container, score_role};
use crate::types::{Message, Role};
use scraper::{ElementRef, Html, Selector};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use tracing::{debug, warn};

/// Content shorter than this (trimmed) is discarded by the selector
/// strategies.
const MIN_CONTENT_LEN: usize = 10;

/// Bounds for the structured whole-page scan.
const SCAN_MIN_LEN: usize = 20;
const SCAN_MAX_LEN: usize = 10_000;
const SCAN_CAP: usize = 50;

/// Bounds for the fallback pattern split.
const SEGMENT_MIN_LEN: usize = 50;
const SEGMENT_MAX_LEN: usize = 5_000;
const SEGMENT_CAP: usize = 20;

/// Messages matching any of these (case-insensitive) are error banners the
/// page renders in place of a conversation.
const ERROR_BANNER_PATTERNS: [&str; 5] = [
    "can't load shared conversation",
    "return to chatgpt",
    "unable to load",
    "not found",
    "something went wrong",
];

/// Navigation and chrome text the whole-page scan must not mistake for a
/// message.
const UI_PATTERNS: [&str; 9] = [
    "sign up",
    "log in",
    "menu",
    "navigation",
    "footer",
    "cookie",
    "privacy",
    "terms",
    "subscribe",
];

pub struct ExtractionEngine;

impl ExtractionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Extract the ordered message sequence from a rendered page. An empty
    /// result means extraction failed for this document; no strategy error
    /// ever escapes as an `Err`.
    pub fn extract(&self, page: &RenderedPage) -> Vec<Message> {
        let document = Html::parse_document(&page.html);

        let strategies: [(&str, fn(&Html) -> Vec<Message>); 5] = [
            ("modern_selectors", strategy_modern_selectors),
            ("alternative_selectors", strategy_alternative_selectors),
            ("generic_selectors", strategy_generic_selectors),
            ("structured_extraction", strategy_structured_extraction),
            ("fallback_pattern", strategy_fallback_pattern),
        ];

        for (name, strategy) in strategies {
            let messages = strategy(&document);
            if !structurally_valid(&messages) {
                debug!("Strategy {} produced no valid conversation", name);
                continue;
            }
            debug!("Strategy {} succeeded with {} messages", name, messages.len());

            let filtered = filter_error_banners(messages);
            if filtered.is_empty() {
                warn!("All extracted messages are error banners for {}", page.url);
                return Vec::new();
            }
            return filtered;
        }

        Vec::new()
    }
}

impl Default for ExtractionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// A conversation is structurally valid when both sides are present among
/// the role-classified messages. `Unknown` messages neither help nor hurt.
pub fn structurally_valid(messages: &[Message]) -> bool {
    let has_user = messages.iter().any(|m| m.role == Role::User);
    let has_assistant = messages.iter().any(|m| m.role == Role::Assistant);
    has_user && has_assistant
}

fn filter_error_banners(messages: Vec<Message>) -> Vec<Message> {
    messages
        .into_iter()
        .filter(|msg| {
            let content = msg.content.to_lowercase();
            !ERROR_BANNER_PATTERNS.iter().any(|pat| content.contains(pat))
        })
        .collect()
}

fn strategy_modern_selectors(document: &Html) -> Vec<Message> {
    let container_selectors = [
        r#"[data-testid*="conversation-turn"]"#,
        r#"[data-testid*="message"]"#,
        r#"div[class*="ConversationItem"]"#,
    ];
    let content_selectors = [".prose", ".markdown", r#"[class*="markdown"]"#, r#"[class*="prose"]"#];

    let containers = first_nonempty_selection(document, &container_selectors);
    collect_from_containers(&containers, &content_selectors, "modern_selectors")
}

fn strategy_alternative_selectors(document: &Html) -> Vec<Message> {
    let content_selectors = [
        r#"div[class*="markdown"]"#,
        ".prose",
        r#"div[class*="prose"]"#,
        ".message-content",
    ];

    let containers = select_all(document, r#"div[class*="group"][class*="w-full"]"#);
    collect_from_containers(&containers, &content_selectors, "alternative_selectors")
}

fn strategy_generic_selectors(document: &Html) -> Vec<Message> {
    let content_selectors = [
        r#"div[class*="markdown"]"#,
        r#"div[class*="prose"]"#,
        ".message-content",
        "p",
    ];

    let containers = select_all(document, r#"div.group, div[class*="message"]"#);
    collect_from_containers(&containers, &content_selectors, "generic_selectors")
}

/// Scan every block-level element, keep the ones that read like a message,
/// and deduplicate on the leading 100 characters of content.
fn strategy_structured_extraction(document: &Html) -> Vec<Message> {
    let mut conversation = Vec::new();
    let mut seen_content = HashSet::new();

    for element in select_all(document, "div, article, section") {
        let text = collect_text(&element);
        let trimmed = text.trim();
        if trimmed.len() <= SCAN_MIN_LEN || trimmed.len() >= SCAN_MAX_LEN {
            continue;
        }
        if !looks_like_message(trimmed) {
            continue;
        }

        let key = content_fingerprint(trimmed);
        if !seen_content.insert(key) {
            continue;
        }

        let role = classify_container(&element);
        conversation.push(Message::new(role, trimmed, "structured_extraction"));
        if conversation.len() >= SCAN_CAP {
            break;
        }
    }

    conversation
}

/// Last resort: split the whole page text on conversation boundary markers
/// and classify the surviving segments by keyword scoring, with segment
/// position breaking ties.
fn strategy_fallback_pattern(document: &Html) -> Vec<Message> {
    let page_text = match select_all(document, "body").into_iter().next() {
        Some(body) => collect_text(&body),
        None => return Vec::new(),
    };

    let boundary_markers = ["\n\n\n", "\n\nUser\n", "\n\nAssistant\n", "\n\nChatGPT\n"];

    let mut segments = vec![page_text];
    for marker in boundary_markers {
        segments = segments
            .into_iter()
            .flat_map(|segment| {
                segment
                    .split(marker)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
    }

    let mut conversation = Vec::new();
    for (position, segment) in segments.iter().enumerate() {
        let cleaned = segment.trim();
        if cleaned.len() <= SEGMENT_MIN_LEN || cleaned.len() >= SEGMENT_MAX_LEN {
            continue;
        }
        let role = score_role(cleaned, position);
        conversation.push(Message::new(role, cleaned, "fallback_pattern"));
        if conversation.len() >= SEGMENT_CAP {
            break;
        }
    }

    conversation
}

fn collect_from_containers(
    containers: &[ElementRef],
    content_selectors: &[&str],
    method: &str,
) -> Vec<Message> {
    let mut conversation = Vec::new();
    for container in containers {
        let role = classify_container(container);
        let content = extract_content(container, content_selectors);
        let trimmed = content.trim();
        if trimmed.len() > MIN_CONTENT_LEN {
            conversation.push(Message::new(role, trimmed, method));
        }
    }
    conversation
}

/// Pull message text out of a container by trying each content selector in
/// priority order, falling back to the container's whole text.
fn extract_content(container: &ElementRef, selectors: &[&str]) -> String {
    for selector_str in selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        let texts: Vec<String> = container
            .select(&selector)
            .map(|el| collect_text(&el).trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();
        if !texts.is_empty() {
            return texts.join("\n");
        }
    }

    collect_text(container).trim().to_string()
}

fn looks_like_message(text: &str) -> bool {
    let text_lower = text.to_lowercase();
    !UI_PATTERNS.iter().any(|pattern| text_lower.contains(pattern))
}

/// Dedup key: hash of the first 100 characters of content.
fn content_fingerprint(content: &str) -> u64 {
    let prefix: String = content.chars().take(100).collect();
    let mut hasher = DefaultHasher::new();
    prefix.hash(&mut hasher);
    hasher.finish()
}

fn first_nonempty_selection<'a>(document: &'a Html, selectors: &[&str]) -> Vec<ElementRef<'a>> {
    for selector_str in selectors {
        let found = select_all(document, selector_str);
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

fn select_all<'a>(document: &'a Html, selector_str: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(selector_str) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Inner-text equivalent: concatenates text nodes, inserting line breaks
/// after block-level elements and skipping script/style subtrees.
pub(crate) fn collect_text(element: &ElementRef) -> String {
    let mut text = String::new();
    push_text(element, &mut text);
    text
}

fn push_text(element: &ElementRef, out: &mut String) {
    const SKIP_TAGS: [&str; 5] = ["script", "style", "noscript", "svg", "template"];

    for child in element.children() {
        if let Some(child_el) = child.value().as_element() {
            let tag = child_el.name();
            if SKIP_TAGS.contains(&tag) {
                continue;
            }
            if let Some(child_ref) = ElementRef::wrap(child) {
                push_text(&child_ref, out);
                if matches!(
                    tag,
                    "p" | "div"
                        | "br"
                        | "h1"
                        | "h2"
                        | "h3"
                        | "h4"
                        | "h5"
                        | "h6"
                        | "li"
                        | "article"
                        | "section"
                ) {
                    out.push('\n');
                }
            }
        } else if let Some(text_node) = child.value().as_text() {
            out.push_str(text_node);
        }
    }
}
