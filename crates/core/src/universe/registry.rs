use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::types::{Company, TickerSymbol};

#[derive(Debug, thiserror::Error)]
pub enum UniverseError {
    #[error("Failed to read universe file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Universe file {} has no Ticker column", path.display())]
    MissingTickerColumn { path: PathBuf },
    #[error("Universe file {} contains no tickers", path.display())]
    Empty { path: PathBuf },
}

/// The fixed set of companies polled each sweep.
///
/// Loaded once at startup from a comma-separated file with a header row.
/// Insertion order is preserved and duplicate symbols collapse to their
/// first occurrence, so sweep order is stable across runs.
#[derive(Debug, Clone)]
pub struct UniverseRegistry {
    companies: IndexMap<TickerSymbol, Company>,
}

impl UniverseRegistry {
    pub fn load(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|source| UniverseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::parse(&content, path)?;
        info!(
            path = %path.display(),
            companies = registry.len(),
            "loaded ticker universe"
        );
        Ok(registry)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, UniverseError> {
        let mut lines = content.lines().filter(|line| !line.trim().is_empty());
        let header = match lines.next() {
            Some(line) => split_row(line),
            None => {
                return Err(UniverseError::Empty {
                    path: path.to_path_buf(),
                })
            }
        };

        let ticker_idx = header
            .iter()
            .position(|h| h.eq_ignore_ascii_case("ticker") || h.eq_ignore_ascii_case("symbol"))
            .ok_or_else(|| UniverseError::MissingTickerColumn {
                path: path.to_path_buf(),
            })?;
        let name_idx = header.iter().position(|h| {
            h.eq_ignore_ascii_case("company name")
                || h.eq_ignore_ascii_case("name")
                || h.eq_ignore_ascii_case("company")
                || h.eq_ignore_ascii_case("security")
        });

        let mut companies = IndexMap::new();
        for line in lines {
            let cells = split_row(line);
            let Some(symbol) = cells.get(ticker_idx).and_then(|c| TickerSymbol::new(c)) else {
                warn!(row = line, "skipping universe row without a ticker");
                continue;
            };
            if companies.contains_key(&symbol) {
                warn!(%symbol, "duplicate ticker in universe file, keeping first");
                continue;
            }
            let name = name_idx.and_then(|i| cells.get(i)).map(String::as_str);
            companies.insert(symbol.clone(), Company::new(symbol, name));
        }

        if companies.is_empty() {
            return Err(UniverseError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(Self { companies })
    }

    /// Builds a registry directly from companies. Used by tests.
    pub fn from_companies(companies: impl IntoIterator<Item = Company>) -> Self {
        let companies = companies
            .into_iter()
            .map(|c| (c.symbol.clone(), c))
            .collect();
        Self { companies }
    }

    pub fn contains(&self, symbol: &TickerSymbol) -> bool {
        self.companies.contains_key(symbol)
    }

    pub fn get(&self, symbol: &TickerSymbol) -> Option<&Company> {
        self.companies.get(symbol)
    }

    /// Companies in file order.
    pub fn companies(&self) -> impl Iterator<Item = &Company> {
        self.companies.values()
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}

/// Splits one comma-separated row, honoring double-quoted cells so company
/// names like `"Amazon.com, Inc."` stay intact.
fn split_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                cells.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}
