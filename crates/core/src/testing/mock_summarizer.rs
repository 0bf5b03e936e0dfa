//! Mock summarizer for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::summarizer::{SummarizeError, Summarizer, SummaryRequest, SummarySegment};
use crate::universe::TickerSymbol;

/// Mock implementation of the `Summarizer` trait.
///
/// By default it fabricates the requested number of short segments from the
/// request itself. Canned texts override that; scripted per-symbol errors
/// make summarization fail.
pub struct MockSummarizer {
    canned: Arc<RwLock<Option<Vec<String>>>>,
    errors: Arc<RwLock<HashSet<TickerSymbol>>>,
    requests: Arc<RwLock<Vec<SummaryRequest>>>,
}

impl Default for MockSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSummarizer {
    pub fn new() -> Self {
        Self {
            canned: Arc::new(RwLock::new(None)),
            errors: Arc::new(RwLock::new(HashSet::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Returns these texts for every request instead of fabricated ones.
    pub async fn set_canned(&self, texts: Vec<String>) {
        *self.canned.write().await = Some(texts);
    }

    pub async fn clear_canned(&self) {
        *self.canned.write().await = None;
    }

    /// Makes every request for the symbol fail until cleared.
    pub async fn set_error_for(&self, symbol: &TickerSymbol) {
        self.errors.write().await.insert(symbol.clone());
    }

    pub async fn clear_error_for(&self, symbol: &TickerSymbol) {
        self.errors.write().await.remove(symbol);
    }

    /// Requests seen, in call order.
    pub async fn requests(&self) -> Vec<SummaryRequest> {
        self.requests.read().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn summarize(
        &self,
        request: &SummaryRequest,
    ) -> Result<Vec<SummarySegment>, SummarizeError> {
        self.requests.write().await.push(request.clone());

        if self.errors.read().await.contains(&request.symbol) {
            return Err(SummarizeError::Api {
                status: 500,
                message: format!("scripted failure for {}", request.symbol),
            });
        }

        let texts = match self.canned.read().await.clone() {
            Some(texts) => texts,
            None => (1..=request.segment_count)
                .map(|i| {
                    format!(
                        "{} {} update {}/{}",
                        request.symbol, request.period, i, request.segment_count
                    )
                })
                .collect(),
        };

        Ok(texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| SummarySegment {
                ordinal: i as u32 + 1,
                text,
            })
            .collect())
    }
}
