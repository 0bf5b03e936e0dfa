mod calendar_api;
mod types;

pub use calendar_api::CalendarApiSource;
pub use types::{FiscalPeriod, SourceError, TranscriptKey, TranscriptRef, TranscriptSource};
