//! In-memory ledger for testing.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::ledger::{LedgerEntry, LedgerError, TranscriptLedger};
use crate::source::TranscriptKey;

/// Mock implementation of the `TranscriptLedger` trait. Nothing touches
/// disk; `fail_next_mark` scripts a one-shot write failure.
pub struct MockLedger {
    entries: Mutex<IndexMap<TranscriptKey, LedgerEntry>>,
    fail_next_mark: AtomicBool,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(IndexMap::new()),
            fail_next_mark: AtomicBool::new(false),
        }
    }

    /// The next `mark_processed` call fails, then behavior returns to
    /// normal.
    pub fn fail_next_mark(&self) {
        self.fail_next_mark.store(true, Ordering::SeqCst);
    }

    /// Seeds an entry without going through `mark_processed`.
    pub fn seed(&self, key: TranscriptKey, locator: &str, published_at: DateTime<Utc>) {
        self.entries.lock().unwrap().insert(
            key.clone(),
            LedgerEntry {
                key,
                locator: locator.to_string(),
                published_at,
            },
        );
    }
}

impl TranscriptLedger for MockLedger {
    fn is_processed(&self, key: &TranscriptKey) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    fn mark_processed(
        &self,
        key: &TranscriptKey,
        locator: &str,
        published_at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        if self.fail_next_mark.swap(false, Ordering::SeqCst) {
            return Err(LedgerError::Write {
                path: "mock-ledger".into(),
                source: std::io::Error::other("scripted mark failure"),
            });
        }
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(key) {
            return Ok(());
        }
        entries.insert(
            key.clone(),
            LedgerEntry {
                key: key.clone(),
                locator: locator.to_string(),
                published_at,
            },
        );
        Ok(())
    }

    fn entries(&self) -> Vec<LedgerEntry> {
        self.entries.lock().unwrap().values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_mark_and_check() {
        let ledger = MockLedger::new();
        let key = fixtures::key("AAPL", "Q3", "2024");
        assert!(!ledger.is_processed(&key));

        ledger.mark_processed(&key, "link", Utc::now()).unwrap();
        assert!(ledger.is_processed(&key));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_scripted_failure_is_one_shot() {
        let ledger = MockLedger::new();
        let key = fixtures::key("AAPL", "Q3", "2024");
        ledger.fail_next_mark();

        assert!(ledger.mark_processed(&key, "link", Utc::now()).is_err());
        assert!(!ledger.is_processed(&key));

        assert!(ledger.mark_processed(&key, "link", Utc::now()).is_ok());
        assert!(ledger.is_processed(&key));
    }
}
