//! Sweep scheduling.
//!
//! `Once` runs a single sweep and returns. `Continuous` sweeps, sleeps for
//! the configured interval, and repeats until stopped. A stop signal is
//! honored between sweeps and interrupts the sleep; a sweep already in
//! progress always runs to completion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::orchestrator::TranscriptOrchestrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Once,
    Continuous,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_mode")]
    pub mode: RunMode,
    /// Minutes between sweeps in continuous mode.
    #[serde(default = "default_poll_interval_minutes")]
    pub poll_interval_minutes: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            poll_interval_minutes: default_poll_interval_minutes(),
        }
    }
}

fn default_mode() -> RunMode {
    RunMode::Continuous
}

fn default_poll_interval_minutes() -> u64 {
    60
}

/// Clean-shutdown hook. Cloneable; any holder can stop the scheduler.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: broadcast::Sender<()>,
}

impl ShutdownHandle {
    pub fn stop(&self) {
        let _ = self.tx.send(());
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchedulerStatus {
    pub running: bool,
    pub sweeps_completed: u64,
    pub last_sweep_at: Option<DateTime<Utc>>,
}

pub struct Scheduler {
    orchestrator: Arc<TranscriptOrchestrator>,
    mode: RunMode,
    interval: Duration,
    running: AtomicBool,
    sweeps_completed: AtomicU64,
    last_sweep_at: Mutex<Option<DateTime<Utc>>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Scheduler {
    pub fn new(
        orchestrator: Arc<TranscriptOrchestrator>,
        mode: RunMode,
        interval: Duration,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            orchestrator,
            mode,
            interval,
            running: AtomicBool::new(false),
            sweeps_completed: AtomicU64::new(0),
            last_sweep_at: Mutex::new(None),
            shutdown_tx,
        }
    }

    pub fn from_config(orchestrator: Arc<TranscriptOrchestrator>, config: &SchedulerConfig) -> Self {
        Self::new(
            orchestrator,
            config.mode,
            Duration::from_secs(config.poll_interval_minutes * 60),
        )
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            running: self.running.load(Ordering::Relaxed),
            sweeps_completed: self.sweeps_completed.load(Ordering::Relaxed),
            last_sweep_at: *self.last_sweep_at.lock().unwrap(),
        }
    }

    /// Runs until the mode says done or a stop signal arrives.
    pub async fn run(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("scheduler already running");
            return;
        }
        // Subscribe before the first sweep so a stop sent mid-sweep is
        // seen at the next select.
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        info!(mode = ?self.mode, "scheduler started");

        loop {
            let report = self.orchestrator.run_sweep().await;
            self.sweeps_completed.fetch_add(1, Ordering::Relaxed);
            *self.last_sweep_at.lock().unwrap() = Some(Utc::now());
            if report.failed() > 0 {
                warn!(failed = report.failed(), "sweep completed with failures");
            }

            if self.mode == RunMode::Once {
                break;
            }
            debug!(secs = self.interval.as_secs(), "sleeping until next sweep");
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("scheduler received stop signal");
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        self.running.store(false, Ordering::SeqCst);
        info!("scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.mode, RunMode::Continuous);
        assert_eq!(config.poll_interval_minutes, 60);
    }

    #[test]
    fn test_mode_deserializes_snake_case() {
        let config: SchedulerConfig = toml::from_str("mode = \"once\"").unwrap();
        assert_eq!(config.mode, RunMode::Once);

        let config: SchedulerConfig = toml::from_str("mode = \"continuous\"").unwrap();
        assert_eq!(config.mode, RunMode::Continuous);

        let result: Result<SchedulerConfig, _> = toml::from_str("mode = \"hourly\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_round_trip() {
        let config = SchedulerConfig {
            mode: RunMode::Once,
            poll_interval_minutes: 15,
        };
        let toml = toml::to_string(&config).unwrap();
        let parsed: SchedulerConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.mode, RunMode::Once);
        assert_eq!(parsed.poll_interval_minutes, 15);
    }
}
