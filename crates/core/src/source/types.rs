use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::fmt;

use crate::universe::{Company, TickerSymbol};

/// Fiscal period labels as the data source reports them, e.g. `Q3` / `2024`.
///
/// Construction validates that both labels are non-blank; a bare quarter
/// number (`3`) is normalized to `Q3` so the same period never yields two
/// different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FiscalPeriod {
    quarter: String,
    year: String,
}

impl FiscalPeriod {
    pub fn new(quarter: &str, year: &str) -> Option<Self> {
        let quarter = quarter.trim().to_uppercase();
        let year = year.trim().to_string();
        if quarter.is_empty() || year.is_empty() {
            return None;
        }
        let quarter = match quarter.parse::<u8>() {
            Ok(n @ 1..=4) => format!("Q{n}"),
            _ => quarter,
        };
        Some(Self { quarter, year })
    }

    /// Derives the calendar quarter from a date: Jan-Mar is Q1, and so on.
    pub fn from_date(date: NaiveDate) -> Self {
        let quarter = (date.month0() / 3) + 1;
        Self {
            quarter: format!("Q{quarter}"),
            year: date.year().to_string(),
        }
    }

    pub fn quarter(&self) -> &str {
        &self.quarter
    }

    pub fn year(&self) -> &str {
        &self.year
    }
}

impl fmt::Display for FiscalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quarter, self.year)
    }
}

/// Identity of one earnings call: symbol plus fiscal period. This is the
/// deduplication unit; two keys are the same call exactly when they compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranscriptKey {
    pub symbol: TickerSymbol,
    pub period: FiscalPeriod,
}

impl TranscriptKey {
    pub fn new(symbol: TickerSymbol, period: FiscalPeriod) -> Self {
        Self { symbol, period }
    }
}

impl fmt::Display for TranscriptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.symbol, self.period)
    }
}

/// A transcript the source reports as available. Transient; only the key
/// and locator outlive the sweep that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRef {
    pub key: TranscriptKey,
    /// Where a reader can find the transcript. Opaque to the pipeline.
    pub locator: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Calendar request failed: {0}")]
    Request(String),
    #[error("Calendar request timeout")]
    Timeout,
    #[error("Calendar API error {status}: {detail}")]
    Api { status: u16, detail: String },
    #[error("Failed to decode calendar reply: {0}")]
    Decode(String),
}

/// Where transcripts come from.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the most recently published transcript for the company, or
    /// `None` when the source has nothing new to report. Malformed period
    /// data must be resolved or dropped here; a returned key is always valid.
    async fn fetch_latest(&self, company: &Company) -> Result<Option<TranscriptRef>, SourceError>;
}
