use anyhow::Context;
use clap::Parser;
use share_harvester::extractor::ExtractionEngine;
use share_harvester::generator::CandidateGenerator;
use share_harvester::insights::InsightExtractor;
use share_harvester::llm::OllamaBackend;
use share_harvester::pipeline::PipelineRunner;
use share_harvester::prober::{HttpProbeTransport, ValidityProber};
use share_harvester::render::HttpRenderer;
use share_harvester::scheduler::Scheduler;
use share_harvester::server::{self, AppState};
use share_harvester::state::RunCounters;
use share_harvester::storage::JsonFileStore;
use share_harvester::types::{
    LlmConfig, ProbeConfig, RenderConfig, SchedulerConfig, StoreConfig,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "share-harvester", about = "Share link processor")]
struct Args {
    /// Address the control surface binds to.
    #[arg(long, default_value = "0.0.0.0:8000")]
    listen: SocketAddr,

    /// Chat endpoint of the local model runtime.
    #[arg(long, default_value = "http://localhost:11434/api/chat")]
    llm_url: String,

    /// Model name the runtime should serve.
    #[arg(long, default_value = "llama3")]
    llm_model: String,

    /// Candidates generated per batch.
    #[arg(long, default_value_t = 20)]
    batch_size: usize,

    /// Concurrent pipeline runs in flight.
    #[arg(long, default_value_t = 3)]
    concurrency: usize,

    /// Directory for transcript artifacts.
    #[arg(long, default_value = "valid_jsons")]
    conversations_dir: String,

    /// Directory for insight artifacts.
    #[arg(long, default_value = "insights_json")]
    insights_dir: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    info!("Starting share harvester");

    let store_config = StoreConfig {
        conversations_dir: args.conversations_dir,
        insights_dir: args.insights_dir,
    };
    let store = JsonFileStore::new(store_config);
    store
        .ensure_directories()
        .await
        .context("failed to create artifact directories")?;
    let store = Arc::new(store);

    let transport =
        Arc::new(HttpProbeTransport::new(&ProbeConfig::default()).context("probe client")?);
    let prober = ValidityProber::new(transport);

    let renderer = Arc::new(HttpRenderer::new(&RenderConfig::default()).context("render client")?);

    let llm_config = LlmConfig {
        base_url: args.llm_url,
        model: args.llm_model,
        ..LlmConfig::default()
    };
    let backend = Arc::new(OllamaBackend::new(llm_config).context("completion client")?);
    let insights = InsightExtractor::new(backend);

    let counters = Arc::new(RunCounters::new());
    let runner = Arc::new(PipelineRunner::new(
        prober,
        renderer,
        ExtractionEngine::new(),
        insights,
        store.clone(),
        counters.clone(),
    ));

    let scheduler_config = SchedulerConfig {
        batch_size: args.batch_size,
        max_concurrency: args.concurrency,
        ..SchedulerConfig::default()
    };
    let scheduler = Arc::new(Scheduler::new(
        CandidateGenerator::new(),
        runner,
        counters.clone(),
        scheduler_config,
    ));

    let state = Arc::new(AppState::new(scheduler, counters, store));
    server::serve(state, args.listen).await?;
    Ok(())
}
