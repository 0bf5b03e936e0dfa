use async_trait::async_trait;

use crate::source::{FiscalPeriod, TranscriptRef};
use crate::universe::{Company, TickerSymbol};

/// Input to a summarization call.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub company_name: String,
    pub symbol: TickerSymbol,
    pub period: FiscalPeriod,
    pub locator: String,
    /// How many thread segments to ask for.
    pub segment_count: u32,
}

impl SummaryRequest {
    pub fn for_transcript(company: &Company, transcript: &TranscriptRef, segment_count: u32) -> Self {
        Self {
            company_name: company.name.clone(),
            symbol: company.symbol.clone(),
            period: transcript.key.period.clone(),
            locator: transcript.locator.clone(),
            segment_count,
        }
    }
}

/// One part of a summary thread. Ordinals are 1-based and contiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarySegment {
    pub ordinal: u32,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Completion request timeout")]
    Timeout,

    #[error("Failed to decode completion: {0}")]
    Decode(String),

    #[error("Model returned no usable segments")]
    EmptyReply,
}

/// Turns a transcript reference into an ordered list of thread segments.
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    async fn summarize(
        &self,
        request: &SummaryRequest,
    ) -> Result<Vec<SummarySegment>, SummarizeError>;
}
