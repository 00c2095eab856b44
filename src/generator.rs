use tracing::debug;
use uuid::Uuid;

pub const SHARE_URL_PREFIX: &str = "https://chatgpt.com/share/";

/// Minimum length for the identifier segment of a share URL. Shorter
/// suffixes are rejected before any network activity happens.
pub const MIN_SUFFIX_LEN: usize = 20;

/// Produces syntactically well-formed candidate share URLs. Stateless;
/// most generated candidates will not correspond to a real conversation.
pub struct CandidateGenerator;

impl CandidateGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate `count` independent random candidates.
    pub fn generate(&self, count: usize) -> Vec<String> {
        let links: Vec<String> = (0..count)
            .map(|_| format!("{}{}", SHARE_URL_PREFIX, Uuid::new_v4()))
            .collect();
        debug!("Generated {} candidate links", links.len());
        links
    }
}

impl Default for CandidateGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural check applied to every candidate before it is probed:
/// fixed prefix plus an identifier suffix of at least [`MIN_SUFFIX_LEN`]
/// characters.
pub fn is_well_formed(url: &str) -> bool {
    match url.strip_prefix(SHARE_URL_PREFIX) {
        Some(suffix) => suffix.len() >= MIN_SUFFIX_LEN && !suffix.contains('/'),
        None => false,
    }
}

/// The identifier segment of a share URL, used for artifact naming.
pub fn locator_suffix(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
