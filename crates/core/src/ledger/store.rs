use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::source::TranscriptKey;

/// One processed transcript. Entries are append-only; nothing ever mutates
/// or removes a recorded entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub key: TranscriptKey,
    pub locator: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Failed to read ledger {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Ledger file {} is not a JSON array: {detail}", path.display())]
    Corrupt { path: PathBuf, detail: String },
    #[error("Failed to write ledger {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to encode ledger: {0}")]
    Encode(String),
}

/// At-most-once bookkeeping for published summaries.
///
/// The ledger is the sole authority on whether a transcript was already
/// handled. The whole ledger lives in memory once loaded, so membership
/// checks cannot fail; only marking can.
pub trait TranscriptLedger: Send + Sync {
    fn is_processed(&self, key: &TranscriptKey) -> bool;

    /// Records a published transcript. Recording a key that is already
    /// present is a no-op, not an error.
    fn mark_processed(
        &self,
        key: &TranscriptKey,
        locator: &str,
        published_at: DateTime<Utc>,
    ) -> Result<(), LedgerError>;

    /// All entries in insertion order.
    fn entries(&self) -> Vec<LedgerEntry>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
