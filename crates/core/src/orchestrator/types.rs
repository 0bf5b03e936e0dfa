use crate::ledger::LedgerError;
use crate::publisher::ThreadPublishError;
use crate::source::SourceError;
use crate::summarizer::SummarizeError;
use crate::universe::TickerSymbol;
use std::fmt;

/// Errors that can stop one company's trip through the pipeline. Never
/// aborts the sweep; the orchestrator records it and moves on.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("Transcript fetch failed: {0}")]
    Source(#[from] SourceError),

    #[error("Summarization failed: {0}")]
    Summarize(#[from] SummarizeError),

    #[error("Thread publication failed: {0}")]
    Publish(#[from] ThreadPublishError),

    #[error("Ledger update failed: {0}")]
    Ledger(#[from] LedgerError),
}

impl OrchestratorError {
    pub fn stage(&self) -> SweepStage {
        match self {
            OrchestratorError::Source(_) => SweepStage::Fetch,
            OrchestratorError::Summarize(_) => SweepStage::Summarize,
            OrchestratorError::Publish(_) => SweepStage::Publish,
            OrchestratorError::Ledger(_) => SweepStage::Ledger,
        }
    }
}

/// Pipeline stage where a company's processing stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStage {
    Fetch,
    Summarize,
    Publish,
    Ledger,
}

impl fmt::Display for SweepStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SweepStage::Fetch => "fetch",
            SweepStage::Summarize => "summarize",
            SweepStage::Publish => "publish",
            SweepStage::Ledger => "ledger",
        };
        f.write_str(name)
    }
}

/// One company's failure during a sweep.
#[derive(Debug)]
pub struct SweepFailure {
    pub symbol: TickerSymbol,
    pub error: OrchestratorError,
}

impl SweepFailure {
    pub fn stage(&self) -> SweepStage {
        self.error.stage()
    }
}

/// Outcome of one full pass over the universe.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub companies_checked: usize,
    pub published: usize,
    pub already_processed: usize,
    pub no_candidate: usize,
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}
