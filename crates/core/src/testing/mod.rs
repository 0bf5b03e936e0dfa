//! Test doubles and fixtures shared by module and integration tests.

mod mock_gateway;
mod mock_ledger;
mod mock_source;
mod mock_summarizer;

pub use mock_gateway::{MockPost, MockPostGateway};
pub use mock_ledger::MockLedger;
pub use mock_source::MockTranscriptSource;
pub use mock_summarizer::MockSummarizer;

pub mod fixtures {
    use crate::source::{FiscalPeriod, TranscriptKey, TranscriptRef};
    use crate::summarizer::SummarySegment;
    use crate::universe::{Company, TickerSymbol, UniverseRegistry};

    pub fn symbol(raw: &str) -> TickerSymbol {
        TickerSymbol::new(raw).unwrap()
    }

    pub fn company(raw_symbol: &str, name: &str) -> Company {
        Company::new(symbol(raw_symbol), Some(name))
    }

    /// Registry of companies named after their symbols, in the given order.
    pub fn universe(symbols: &[&str]) -> UniverseRegistry {
        UniverseRegistry::from_companies(symbols.iter().map(|s| Company::new(symbol(s), None)))
    }

    pub fn period(quarter: &str, year: &str) -> FiscalPeriod {
        FiscalPeriod::new(quarter, year).unwrap()
    }

    pub fn key(raw_symbol: &str, quarter: &str, year: &str) -> TranscriptKey {
        TranscriptKey::new(symbol(raw_symbol), period(quarter, year))
    }

    pub fn transcript(raw_symbol: &str, quarter: &str, year: &str) -> TranscriptRef {
        TranscriptRef {
            key: key(raw_symbol, quarter, year),
            locator: format!("https://example.com/transcripts/{raw_symbol}-{quarter}-{year}"),
        }
    }

    pub fn segments(count: u32) -> Vec<SummarySegment> {
        (1..=count)
            .map(|ordinal| SummarySegment {
                ordinal,
                text: format!("Segment {ordinal} of {count}"),
            })
            .collect()
    }
}
