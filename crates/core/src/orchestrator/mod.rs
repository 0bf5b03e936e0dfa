mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::TranscriptOrchestrator;
pub use types::{OrchestratorError, SweepFailure, SweepReport, SweepStage};
