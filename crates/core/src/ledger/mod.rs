mod json_file;
mod store;

pub use json_file::JsonFileLedger;
pub use store::{LedgerEntry, LedgerError, TranscriptLedger};
