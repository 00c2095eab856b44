use crate::types::{HarvestError, RenderConfig, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// A fully loaded page, ready to be queried by the extraction engine.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: String,
    pub html: String,
}

/// Capability seam for turning a share URL into a queryable document.
///
/// A DOM-rendering engine (headless browser, "wait for network idle") plugs
/// in here; the crate ships a plain HTTP implementation as its default
/// collaborator.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<RenderedPage>;
}

pub struct HttpRenderer {
    client: Client,
    settle_delay: Duration,
}

impl HttpRenderer {
    pub fn new(config: &RenderConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .build()?;
        Ok(Self {
            client,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
        })
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &str) -> Result<RenderedPage> {
        debug!("Rendering page: {}", url);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(HarvestError::Render(format!(
                "HTTP {} while rendering {}",
                response.status(),
                url
            )));
        }
        let html = response.text().await?;
        if !self.settle_delay.is_zero() {
            sleep(self.settle_delay).await;
        }
        Ok(RenderedPage {
            url: url.to_string(),
            html,
        })
    }
}
