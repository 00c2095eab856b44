//! Background scheduling loop.
//!
//! Generates candidate batches, dispatches them to the pipeline under a
//! fixed concurrency bound, and adapts pacing to the batch-level success
//! rate. The loop never terminates itself on error; only the shared running
//! flag, checked between batches, stops it.

use crate::generator::CandidateGenerator;
use crate::pipeline::PipelineRunner;
use crate::state::RunCounters;
use crate::types::{Result, SchedulerConfig};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, Semaphore};
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Tracks consecutive zero-success batches and decides when the loop should
/// take an extended cooldown. Pure state machine, no clocks inside.
#[derive(Debug)]
pub struct FailureTracker {
    consecutive_failures: u32,
    threshold: u32,
}

impl FailureTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            consecutive_failures: 0,
            threshold: threshold.max(1),
        }
    }

    /// Record a finished batch. Returns true when the consecutive-failure
    /// count just crossed a threshold multiple and a cooldown is due. Any
    /// success resets the count to zero.
    pub fn record_batch(&mut self, successes: usize) -> bool {
        if successes > 0 {
            self.consecutive_failures = 0;
            return false;
        }
        self.consecutive_failures += 1;
        self.consecutive_failures % self.threshold == 0
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

pub struct Scheduler {
    generator: CandidateGenerator,
    runner: Arc<PipelineRunner>,
    counters: Arc<RunCounters>,
    config: SchedulerConfig,
    semaphore: Arc<Semaphore>,
    is_running: Arc<RwLock<bool>>,
}

impl Scheduler {
    pub fn new(
        generator: CandidateGenerator,
        runner: Arc<PipelineRunner>,
        counters: Arc<RunCounters>,
        config: SchedulerConfig,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        Self {
            generator,
            runner,
            counters,
            config,
            semaphore,
            is_running: Arc::new(RwLock::new(false)),
        }
    }

    /// Shared flag the control surface flips to start or stop the loop.
    pub fn running_flag(&self) -> Arc<RwLock<bool>> {
        self.is_running.clone()
    }

    /// Main loop: runs until the running flag drops. Batches are strictly
    /// sequential; one batch fully completes, stragglers included, before
    /// the next is generated.
    pub async fn run(&self) {
        info!("Background worker started");
        let mut tracker = FailureTracker::new(self.config.failure_threshold);

        while *self.is_running.read().await {
            match self.run_batch().await {
                Ok(successes) => {
                    if tracker.record_batch(successes) {
                        warn!(
                            "No successful links processed in {} batches",
                            tracker.consecutive_failures()
                        );
                        sleep(Duration::from_secs(self.config.cooldown_seconds)).await;
                    }
                    // Inter-batch rate limiting, independent of the
                    // failure-driven cooldown.
                    sleep(Duration::from_secs(self.config.batch_interval_seconds)).await;
                }
                Err(e) => {
                    error!("Error in background worker: {}", e);
                    let _ = tracker.record_batch(0);
                    sleep(Duration::from_secs(self.config.recovery_seconds)).await;
                }
            }
        }

        info!("Background worker stopped");
    }

    /// Generate and dispatch one batch, bounded by the concurrency pool.
    /// Returns the number of candidates that produced a pipeline result.
    pub async fn run_batch(&self) -> Result<usize> {
        let links = self.generator.generate(self.config.batch_size);
        if links.is_empty() {
            return Ok(0);
        }
        self.counters.add_generated(links.len() as u64);
        info!("Generated {} new links", links.len());

        let tasks = links.into_iter().map(|link| {
            let semaphore = self.semaphore.clone();
            let runner = self.runner.clone();
            async move {
                match semaphore.acquire().await {
                    Ok(_permit) => runner.process(&link).await,
                    Err(_) => None,
                }
            }
        });

        let results = join_all(tasks).await;
        let successful = results.iter().filter(|r| r.is_some()).count();
        info!(
            "Successfully processed {}/{} links",
            successful,
            results.len()
        );
        Ok(successful)
    }
}
