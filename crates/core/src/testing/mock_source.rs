//! Mock transcript source for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::source::{SourceError, TranscriptRef, TranscriptSource};
use crate::universe::{Company, TickerSymbol};

/// Mock implementation of the `TranscriptSource` trait.
///
/// Symbols without a scripted transcript report nothing new. Symbols marked
/// with `set_error` fail on every fetch until cleared, which is how tests
/// exercise failure containment.
pub struct MockTranscriptSource {
    replies: Arc<RwLock<HashMap<TickerSymbol, TranscriptRef>>>,
    errors: Arc<RwLock<HashSet<TickerSymbol>>>,
    fetches: Arc<RwLock<Vec<TickerSymbol>>>,
}

impl Default for MockTranscriptSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscriptSource {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(RwLock::new(HashMap::new())),
            errors: Arc::new(RwLock::new(HashSet::new())),
            fetches: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Scripts the latest transcript for the symbol in its key.
    pub async fn set_latest(&self, transcript: TranscriptRef) {
        self.replies
            .write()
            .await
            .insert(transcript.key.symbol.clone(), transcript);
    }

    pub async fn clear_latest(&self, symbol: &TickerSymbol) {
        self.replies.write().await.remove(symbol);
    }

    /// Makes every fetch for the symbol fail until cleared.
    pub async fn set_error(&self, symbol: &TickerSymbol) {
        self.errors.write().await.insert(symbol.clone());
    }

    pub async fn clear_error(&self, symbol: &TickerSymbol) {
        self.errors.write().await.remove(symbol);
    }

    /// Symbols fetched, in call order.
    pub async fn fetched(&self) -> Vec<TickerSymbol> {
        self.fetches.read().await.clone()
    }

    pub async fn fetch_count(&self) -> usize {
        self.fetches.read().await.len()
    }
}

#[async_trait]
impl TranscriptSource for MockTranscriptSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_latest(&self, company: &Company) -> Result<Option<TranscriptRef>, SourceError> {
        self.fetches.write().await.push(company.symbol.clone());

        if self.errors.read().await.contains(&company.symbol) {
            return Err(SourceError::Api {
                status: 500,
                detail: format!("scripted failure for {}", company.symbol),
            });
        }
        Ok(self.replies.read().await.get(&company.symbol).cloned())
    }
}
