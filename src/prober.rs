use crate::generator::is_well_formed;
use crate::types::{ProbeConfig, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Classification of one candidate after the lightweight probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Candidate looks like a real, publicly shared conversation page.
    Accessible,
    /// Final destination is an auth boundary, or the body carries a
    /// private/deleted banner.
    RequiresAuth,
    NotFound,
    Forbidden,
    /// Transport failure, timeout, or an unmapped error status.
    TransportError,
    /// Malformed locator, rejected without any network call.
    StructurallyInvalid,
}

impl ProbeOutcome {
    pub fn is_accessible(&self) -> bool {
        matches!(self, ProbeOutcome::Accessible)
    }
}

/// What a single redirect-following fetch came back with.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: u16,
    pub final_url: String,
    pub body: String,
}

/// Transport seam for the prober, so validation logic can be exercised
/// against a stub without a network.
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ProbeResponse>;
}

pub struct HttpProbeTransport {
    client: Client,
}

impl HttpProbeTransport {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ProbeTransport for HttpProbeTransport {
    async fn fetch(&self, url: &str) -> Result<ProbeResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        Ok(ProbeResponse {
            status,
            final_url,
            body,
        })
    }
}

/// Body substrings that mark a page as private, deleted, or broken.
const ERROR_INDICATORS: [&str; 5] = [
    "conversation not found",
    "this conversation is private",
    "unable to load",
    "something went wrong",
    "conversation has been deleted",
];

/// Substrings a real conversation page is expected to carry. A body must
/// contain at least two distinct ones to pass.
const POSITIVE_INDICATORS: [&str; 5] = ["chatgpt", "conversation", "message", "user:", "assistant:"];

const AUTH_HOST: &str = "auth.openai.com";

/// Cheap filter run before full extraction. Classifies a candidate without
/// mutating any shared state.
pub struct ValidityProber {
    transport: Arc<dyn ProbeTransport>,
}

impl ValidityProber {
    pub fn new(transport: Arc<dyn ProbeTransport>) -> Self {
        Self { transport }
    }

    pub async fn probe(&self, url: &str) -> ProbeOutcome {
        if !is_well_formed(url) {
            warn!("Invalid URL format: {}", url);
            return ProbeOutcome::StructurallyInvalid;
        }

        let response = match self.transport.fetch(url).await {
            Ok(r) => r,
            Err(e) => {
                debug!("Probe transport error for {}: {}", url, e);
                return ProbeOutcome::TransportError;
            }
        };

        if redirected_to_auth(&response.final_url) {
            info!("Link requires authentication (private): {}", url);
            return ProbeOutcome::RequiresAuth;
        }

        match response.status {
            404 => return ProbeOutcome::NotFound,
            403 => {
                info!("Link forbidden (403): {}", url);
                return ProbeOutcome::Forbidden;
            }
            s if s >= 400 => {
                warn!("Link returned error status {}: {}", s, url);
                return ProbeOutcome::TransportError;
            }
            _ => {}
        }

        let body = response.body.to_lowercase();
        for indicator in ERROR_INDICATORS {
            if body.contains(indicator) {
                info!("Link contains error indicator '{}': {}", indicator, url);
                return ProbeOutcome::RequiresAuth;
            }
        }

        let positive_count = POSITIVE_INDICATORS
            .iter()
            .filter(|indicator| body.contains(**indicator))
            .count();
        if positive_count < 2 {
            info!("Link doesn't appear to be a conversation page: {}", url);
            return ProbeOutcome::NotFound;
        }

        info!("Link validation successful: {}", url);
        ProbeOutcome::Accessible
    }
}

fn redirected_to_auth(final_url: &str) -> bool {
    if final_url.to_lowercase().contains("login") {
        return true;
    }
    match Url::parse(final_url) {
        Ok(parsed) => parsed
            .host_str()
            .map(|h| h == AUTH_HOST)
            .unwrap_or(false),
        Err(_) => false,
    }
}
