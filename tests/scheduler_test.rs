use async_trait::async_trait;
use share_harvester::extractor::ExtractionEngine;
use share_harvester::generator::CandidateGenerator;
use share_harvester::insights::InsightExtractor;
use share_harvester::llm::MockBackend;
use share_harvester::pipeline::PipelineRunner;
use share_harvester::prober::{ProbeResponse, ProbeTransport, ValidityProber};
use share_harvester::render::{PageRenderer, RenderedPage};
use share_harvester::scheduler::{FailureTracker, Scheduler};
use share_harvester::state::RunCounters;
use share_harvester::storage::MemoryStore;
use share_harvester::types::{Result, SchedulerConfig};
use std::sync::Arc;

#[test]
fn failure_tracker_cools_down_at_each_threshold_crossing() {
    let mut tracker = FailureTracker::new(3);

    assert!(!tracker.record_batch(0));
    assert!(!tracker.record_batch(0));
    assert!(tracker.record_batch(0), "third zero-success batch crosses the threshold");
    assert!(!tracker.record_batch(0));
    assert!(!tracker.record_batch(0));
    assert!(tracker.record_batch(0), "sixth crossing fires again");
    assert_eq!(tracker.consecutive_failures(), 6);
}

#[test]
fn any_success_resets_the_failure_streak() {
    let mut tracker = FailureTracker::new(3);
    tracker.record_batch(0);
    tracker.record_batch(0);
    assert_eq!(tracker.consecutive_failures(), 2);

    assert!(!tracker.record_batch(5));
    assert_eq!(tracker.consecutive_failures(), 0);

    // The streak starts over from scratch.
    assert!(!tracker.record_batch(0));
    assert!(!tracker.record_batch(0));
    assert!(tracker.record_batch(0));
}

struct NotFoundTransport;

#[async_trait]
impl ProbeTransport for NotFoundTransport {
    async fn fetch(&self, url: &str) -> Result<ProbeResponse> {
        Ok(ProbeResponse {
            status: 404,
            final_url: url.to_string(),
            body: String::new(),
        })
    }
}

struct EmptyRenderer;

#[async_trait]
impl PageRenderer for EmptyRenderer {
    async fn render(&self, url: &str) -> Result<RenderedPage> {
        Ok(RenderedPage {
            url: url.to_string(),
            html: "<html><body></body></html>".to_string(),
        })
    }
}

#[tokio::test]
async fn all_rejected_batch_reports_zero_successes_and_counts() {
    let counters = Arc::new(RunCounters::new());
    let runner = Arc::new(PipelineRunner::new(
        ValidityProber::new(Arc::new(NotFoundTransport)),
        Arc::new(EmptyRenderer),
        ExtractionEngine::new(),
        InsightExtractor::new(Arc::new(MockBackend::unavailable())),
        Arc::new(MemoryStore::new()),
        counters.clone(),
    ));

    let config = SchedulerConfig {
        batch_size: 8,
        max_concurrency: 3,
        ..SchedulerConfig::default()
    };
    let scheduler = Scheduler::new(CandidateGenerator::new(), runner, counters.clone(), config);

    let successes = scheduler.run_batch().await.unwrap();
    assert_eq!(successes, 0);

    let snapshot = counters.snapshot();
    assert_eq!(snapshot.links_generated, 8);
    assert_eq!(snapshot.failed_validations, 8);
    assert_eq!(snapshot.valid_links, 0);
}

#[tokio::test]
async fn counters_accumulate_across_batches() {
    let counters = Arc::new(RunCounters::new());
    let runner = Arc::new(PipelineRunner::new(
        ValidityProber::new(Arc::new(NotFoundTransport)),
        Arc::new(EmptyRenderer),
        ExtractionEngine::new(),
        InsightExtractor::new(Arc::new(MockBackend::unavailable())),
        Arc::new(MemoryStore::new()),
        counters.clone(),
    ));

    let config = SchedulerConfig {
        batch_size: 4,
        max_concurrency: 2,
        ..SchedulerConfig::default()
    };
    let scheduler = Scheduler::new(CandidateGenerator::new(), runner, counters.clone(), config);

    scheduler.run_batch().await.unwrap();
    scheduler.run_batch().await.unwrap();

    let snapshot = counters.snapshot();
    assert_eq!(snapshot.links_generated, 8);
    assert_eq!(snapshot.failed_validations, 8);
}
