use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::orchestrator::OrchestratorConfig;
use crate::scheduler::SchedulerConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub universe: UniverseConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub source: SourceConfig,
    pub summarizer: SummarizerConfig,
    pub publisher: PublisherConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Ticker universe configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UniverseConfig {
    /// Path to the index membership file (header row, `Ticker` column required).
    #[serde(default = "default_universe_path")]
    pub path: PathBuf,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            path: default_universe_path(),
        }
    }
}

fn default_universe_path() -> PathBuf {
    PathBuf::from("combined-indexes.csv")
}

/// Processed-transcript ledger configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
    /// Path to the ledger file. Created on first mark if missing.
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
        }
    }
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("processed_transcripts.json")
}

/// Earnings calendar source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Calendar API base URL.
    #[serde(default = "default_source_api_base")]
    pub api_base: String,
    /// Optional API key passed as a query parameter.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u32,
    /// Locator template used when the calendar reply carries no transcript
    /// URL. `{symbol}` is replaced with the ticker symbol.
    #[serde(default = "default_events_url_template")]
    pub events_url_template: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_base: default_source_api_base(),
            api_key: None,
            timeout_secs: default_source_timeout(),
            events_url_template: default_events_url_template(),
        }
    }
}

fn default_source_api_base() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_source_timeout() -> u32 {
    30
}

fn default_events_url_template() -> String {
    "https://finance.yahoo.com/quote/{symbol}/events?p={symbol}".to_string()
}

/// Summarizer (LLM) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummarizerConfig {
    /// OpenAI-compatible API base URL.
    #[serde(default = "default_summarizer_api_base")]
    pub api_base: String,
    /// API key (required).
    pub api_key: String,
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens for the completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Number of thread segments to request per transcript.
    #[serde(default = "default_segment_count")]
    pub segment_count: u32,
    /// Request timeout in seconds (default: 60)
    #[serde(default = "default_summarizer_timeout")]
    pub timeout_secs: u32,
}

fn default_summarizer_api_base() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_segment_count() -> u32 {
    5
}

fn default_summarizer_timeout() -> u32 {
    60
}

/// Thread publisher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublisherConfig {
    /// Posting API base URL.
    #[serde(default = "default_publisher_api_base")]
    pub api_base: String,
    /// Bearer token for the posting API (required).
    pub bearer_token: String,
    /// Platform per-post character limit.
    #[serde(default = "default_max_post_chars")]
    pub max_post_chars: usize,
    /// Pause between consecutive posts in a thread (milliseconds).
    #[serde(default = "default_post_delay")]
    pub post_delay_ms: u64,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_publisher_timeout")]
    pub timeout_secs: u32,
}

fn default_publisher_api_base() -> String {
    "https://api.twitter.com".to_string()
}

fn default_max_post_chars() -> usize {
    280
}

fn default_post_delay() -> u64 {
    1000
}

fn default_publisher_timeout() -> u32 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::RunMode;

    const MINIMAL: &str = r#"
[summarizer]
api_key = "sk-test"

[publisher]
bearer_token = "token"
"#;

    #[test]
    fn test_deserialize_minimal_config() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.summarizer.api_key, "sk-test");
        assert_eq!(config.summarizer.model, "gpt-4");
        assert_eq!(config.summarizer.segment_count, 5);
        assert_eq!(config.publisher.bearer_token, "token");
        assert_eq!(config.publisher.max_post_chars, 280);
        assert_eq!(
            config.universe.path.to_str().unwrap(),
            "combined-indexes.csv"
        );
        assert_eq!(
            config.ledger.path.to_str().unwrap(),
            "processed_transcripts.json"
        );
        assert_eq!(config.scheduler.poll_interval_minutes, 60);
        assert!(matches!(config.scheduler.mode, RunMode::Continuous));
    }

    #[test]
    fn test_deserialize_missing_summarizer_fails() {
        let toml = r#"
[publisher]
bearer_token = "token"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_missing_publisher_fails() {
        let toml = r#"
[summarizer]
api_key = "sk-test"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[universe]
path = "sp500.csv"

[ledger]
path = "/var/lib/callthread/ledger.json"

[source]
api_base = "https://calendar.example.com"
api_key = "cal-key"
timeout_secs = 10

[summarizer]
api_base = "https://llm.example.com"
api_key = "sk-test"
model = "gpt-4-turbo"
max_tokens = 1500
temperature = 0.2
segment_count = 7

[publisher]
api_base = "https://posts.example.com"
bearer_token = "token"
max_post_chars = 500
post_delay_ms = 250

[orchestrator]
ticker_delay_ms = 0

[scheduler]
mode = "once"
poll_interval_minutes = 120
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.universe.path.to_str().unwrap(), "sp500.csv");
        assert_eq!(config.source.api_key.as_deref(), Some("cal-key"));
        assert_eq!(config.summarizer.model, "gpt-4-turbo");
        assert_eq!(config.summarizer.segment_count, 7);
        assert_eq!(config.publisher.max_post_chars, 500);
        assert_eq!(config.publisher.post_delay_ms, 250);
        assert_eq!(config.orchestrator.ticker_delay_ms, 0);
        assert!(matches!(config.scheduler.mode, RunMode::Once));
        assert_eq!(config.scheduler.poll_interval_minutes, 120);
    }

    #[test]
    fn test_source_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.source.api_base, "https://query1.finance.yahoo.com");
        assert!(config.source.api_key.is_none());
        assert_eq!(config.source.timeout_secs, 30);
        assert!(config.source.events_url_template.contains("{symbol}"));
    }
}
