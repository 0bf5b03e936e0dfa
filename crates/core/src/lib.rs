pub mod config;
pub mod ledger;
pub mod orchestrator;
pub mod publisher;
pub mod scheduler;
pub mod source;
pub mod summarizer;
pub mod testing;
pub mod universe;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LedgerConfig,
    PublisherConfig, SourceConfig, SummarizerConfig, UniverseConfig,
};
pub use ledger::{JsonFileLedger, LedgerEntry, LedgerError, TranscriptLedger};
pub use orchestrator::{
    OrchestratorConfig, OrchestratorError, SweepFailure, SweepReport, SweepStage,
    TranscriptOrchestrator,
};
pub use publisher::{
    NewPost, PostError, PostGateway, PostId, PostReceipt, PublishedThread, ThreadPost,
    ThreadPublishError, ThreadPublisher, TwitterGateway,
};
pub use scheduler::{RunMode, Scheduler, SchedulerConfig, SchedulerStatus, ShutdownHandle};
pub use source::{
    CalendarApiSource, FiscalPeriod, SourceError, TranscriptKey, TranscriptRef, TranscriptSource,
};
pub use summarizer::{
    OpenAiSummarizer, SummarizeError, Summarizer, SummaryRequest, SummarySegment,
};
pub use universe::{Company, TickerSymbol, UniverseError, UniverseRegistry};
