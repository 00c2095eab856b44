pub mod extractor;
pub mod generator;
pub mod insights;
pub mod llm;
pub mod pipeline;
pub mod prober;
pub mod render;
pub mod roles;
pub mod scheduler;
pub mod server;
pub mod state;
pub mod storage;
pub mod types;

pub use extractor::ExtractionEngine;
pub use generator::CandidateGenerator;
pub use insights::InsightExtractor;
pub use pipeline::PipelineRunner;
pub use prober::{ProbeOutcome, ValidityProber};
pub use render::{PageRenderer, RenderedPage};
pub use scheduler::Scheduler;
pub use state::RunCounters;
pub use storage::{ArtifactKind, ArtifactStore, JsonFileStore, MemoryStore};
pub use types::*;
