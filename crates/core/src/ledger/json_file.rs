use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

use super::store::{LedgerEntry, LedgerError, TranscriptLedger};
use crate::source::{FiscalPeriod, TranscriptKey};
use crate::universe::TickerSymbol;

/// File-backed ledger: a pretty-printed JSON array of flat entry objects.
///
/// The full file is decoded at startup and held in memory; every successful
/// mark rewrites the file through a sibling temp file and an atomic rename,
/// so a crash mid-write never leaves a half-written ledger behind.
pub struct JsonFileLedger {
    path: PathBuf,
    entries: Mutex<IndexMap<TranscriptKey, LedgerEntry>>,
}

impl JsonFileLedger {
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        if !path.exists() {
            info!(path = %path.display(), "no ledger file yet, starting empty");
            return Ok(Self {
                path: path.to_path_buf(),
                entries: Mutex::new(IndexMap::new()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| LedgerError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let values: Vec<serde_json::Value> =
            serde_json::from_str(&content).map_err(|e| LedgerError::Corrupt {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;

        let mut entries = IndexMap::new();
        let mut skipped = 0usize;
        for value in values {
            let entry = match serde_json::from_value::<RawEntry>(value).map(decode_entry) {
                Ok(Some(entry)) => entry,
                Ok(None) => {
                    warn!("skipping ledger entry with invalid key fields");
                    skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "skipping undecodable ledger entry");
                    skipped += 1;
                    continue;
                }
            };
            if entries.contains_key(&entry.key) {
                warn!(key = %entry.key, "duplicate ledger entry, keeping first");
                continue;
            }
            entries.insert(entry.key.clone(), entry);
        }

        info!(
            path = %path.display(),
            entries = entries.len(),
            skipped,
            "loaded transcript ledger"
        );
        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    fn persist(&self, entries: &IndexMap<TranscriptKey, LedgerEntry>) -> Result<(), LedgerError> {
        let raw: Vec<RawEntry> = entries.values().map(encode_entry).collect();
        let json =
            serde_json::to_string_pretty(&raw).map_err(|e| LedgerError::Encode(e.to_string()))?;

        let tmp = temp_sibling(&self.path);
        std::fs::write(&tmp, json).map_err(|source| LedgerError::Write {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| LedgerError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl TranscriptLedger for JsonFileLedger {
    fn is_processed(&self, key: &TranscriptKey) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    fn mark_processed(
        &self,
        key: &TranscriptKey,
        locator: &str,
        published_at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(key) {
            debug!(key = %key, "transcript already recorded");
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
        if let Err(e) = self.persist(&entries) {
            // Memory must mirror disk, or the entry would vanish on restart
            // while this process still thinks it was recorded.
            entries.shift_remove(key);
            return Err(e);
        }
        Ok(())
    }

    fn entries(&self) -> Vec<LedgerEntry> {
        self.entries.lock().unwrap().values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ledger".to_string());
    path.with_file_name(format!("{name}.tmp"))
}

/// On-disk entry shape: flat fields, `year` tolerated as number or string,
/// `timestamp` tolerated with or without a timezone offset.
#[derive(Debug, Serialize, Deserialize)]
struct RawEntry {
    ticker: String,
    quarter: String,
    year: RawYear,
    link: String,
    timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawYear {
    Text(String),
    Number(i64),
}

impl RawYear {
    fn as_string(&self) -> String {
        match self {
            RawYear::Text(s) => s.clone(),
            RawYear::Number(n) => n.to_string(),
        }
    }
}

/// `None` means the raw fields do not name a valid transcript key.
fn decode_entry(raw: RawEntry) -> Option<LedgerEntry> {
    let symbol = TickerSymbol::new(&raw.ticker)?;
    let period = FiscalPeriod::new(&raw.quarter, &raw.year.as_string())?;
    let published_at = parse_timestamp(&raw.timestamp)?;
    Some(LedgerEntry {
        key: TranscriptKey::new(symbol, period),
        locator: raw.link,
        published_at,
    })
}

fn encode_entry(entry: &LedgerEntry) -> RawEntry {
    RawEntry {
        ticker: entry.key.symbol.as_str().to_string(),
        quarter: entry.key.period.quarter().to_string(),
        year: RawYear::Text(entry.key.period.year().to_string()),
        link: entry.locator.clone(),
        timestamp: entry.published_at.to_rfc3339(),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // Legacy entries carry a naive ISO timestamp; read them as UTC.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
