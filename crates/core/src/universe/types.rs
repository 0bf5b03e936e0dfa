use std::fmt;

/// Normalized ticker symbol. Construction trims and uppercases, so lookups
/// and ledger keys never disagree on case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickerSymbol(String);

impl TickerSymbol {
    /// Returns `None` for a blank symbol.
    pub fn new(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A company in the polling universe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub symbol: TickerSymbol,
    /// Display name used in prompts and post headers. Falls back to the
    /// symbol when the universe file carries no name column.
    pub name: String,
}

impl Company {
    pub fn new(symbol: TickerSymbol, name: Option<&str>) -> Self {
        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => symbol.as_str().to_string(),
        };
        Self { symbol, name }
    }
}
