//! Per-candidate processing pipeline.
//!
//! One run sequences probe → render → extract → title → persist transcript
//! → insights, tolerating partial failure at every stage. Every error is
//! caught at this boundary and converted into a discard (`None`); nothing
//! ever escapes into the scheduler loop. There are no per-candidate
//! retries — the batch level regenerates fresh candidates instead.

use crate::extractor::ExtractionEngine;
use crate::generator::locator_suffix;
use crate::insights::{generate_title, InsightExtractor};
use crate::prober::ValidityProber;
use crate::render::PageRenderer;
use crate::state::RunCounters;
use crate::storage::{ArtifactKind, ArtifactStore};
use crate::types::{PipelineResult, Result, Transcript};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Minimum messages for insight extraction to be worth attempting.
const MIN_MESSAGES_FOR_INSIGHTS: usize = 2;

const FILENAME_TITLE_MAX_LEN: usize = 50;

pub struct PipelineRunner {
    prober: ValidityProber,
    renderer: Arc<dyn PageRenderer>,
    extractor: ExtractionEngine,
    insights: InsightExtractor,
    store: Arc<dyn ArtifactStore>,
    counters: Arc<RunCounters>,
}

impl PipelineRunner {
    pub fn new(
        prober: ValidityProber,
        renderer: Arc<dyn PageRenderer>,
        extractor: ExtractionEngine,
        insights: InsightExtractor,
        store: Arc<dyn ArtifactStore>,
        counters: Arc<RunCounters>,
    ) -> Self {
        Self {
            prober,
            renderer,
            extractor,
            insights,
            store,
            counters,
        }
    }

    /// Run one candidate through the whole pipeline. `None` means the
    /// candidate was discarded at some stage.
    pub async fn process(&self, url: &str) -> Option<PipelineResult> {
        match self.run(url).await {
            Ok(result) => result,
            Err(e) => {
                error!("Error processing link {}: {}", url, e);
                None
            }
        }
    }

    async fn run(&self, url: &str) -> Result<Option<PipelineResult>> {
        let outcome = self.prober.probe(url).await;
        if !outcome.is_accessible() {
            self.counters.record_failed_validation();
            return Ok(None);
        }
        self.counters.record_valid_link();
        info!("Link validated successfully: {}", url);

        let page = match self.renderer.render(url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Failed to render {}: {}", url, e);
                return Ok(None);
            }
        };

        let messages = self.extractor.extract(&page);
        if messages.is_empty() {
            warn!("No conversation data extracted from: {}", url);
            return Ok(None);
        }

        let transcript = Transcript::new(url.to_string(), messages);
        info!(
            "Extracted conversation with {} messages: {} user, {} assistant",
            transcript.metadata.total_messages,
            transcript.metadata.user_messages,
            transcript.metadata.assistant_messages
        );

        // Title generation is the pipeline's one soft-failure point: it
        // degrades to a placeholder rather than discarding the run.
        let title = generate_title(&transcript.messages);
        let title = if title.is_empty() {
            "Untitled_Conversation".to_string()
        } else {
            title
        };

        let filename = artifact_filename(&title, url);

        let transcript_json = serde_json::to_value(&transcript)?;
        if let Err(e) = self
            .store
            .write(ArtifactKind::Conversation, &filename, &transcript_json)
            .await
        {
            // No partial persistence: if the transcript cannot be written,
            // the run ends before any insight work happens.
            error!("Failed to save conversation {}: {}", url, e);
            return Ok(None);
        }

        let mut insights_file = None;
        if transcript.metadata.total_messages >= MIN_MESSAGES_FOR_INSIGHTS {
            let insight = self.insights.extract_insights(&transcript.messages).await;
            let insight_json = serde_json::to_value(&insight)?;
            match self
                .store
                .write(ArtifactKind::Insight, &filename, &insight_json)
                .await
            {
                Ok(()) => {
                    self.counters.record_insight();
                    insights_file = Some(filename.clone());
                }
                Err(e) => {
                    // Insights are best-effort; the transcript already
                    // landed, so the run still counts as persisted.
                    error!("Error saving insights for {}: {}", url, e);
                }
            }
        } else {
            warn!("Insufficient conversation data for insights extraction: {}", url);
        }

        Ok(Some(PipelineResult {
            url: url.to_string(),
            conversation_file: filename,
            insights_file,
            message_count: transcript.metadata.total_messages,
            title,
        }))
    }
}

/// Artifact name shared by the transcript and its insight: sanitized title
/// plus the locator's identifier suffix.
fn artifact_filename(title: &str, url: &str) -> String {
    let sanitized: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim_end()
        .chars()
        .take(FILENAME_TITLE_MAX_LEN)
        .collect();
    let sanitized = if sanitized.is_empty() {
        "Conversation".to_string()
    } else {
        sanitized
    };
    format!("{}_{}.json", sanitized, locator_suffix(url))
}
