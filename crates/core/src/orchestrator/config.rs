use serde::{Deserialize, Serialize};

/// Orchestrator pacing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrchestratorConfig {
    /// Pause between consecutive companies in a sweep (milliseconds).
    /// Zero disables the pause.
    #[serde(default = "default_ticker_delay_ms")]
    pub ticker_delay_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            ticker_delay_ms: default_ticker_delay_ms(),
        }
    }
}

fn default_ticker_delay_ms() -> u64 {
    1000
}
