//! Sweep driver.
//!
//! One sweep walks the universe in file order, one company at a time:
//! fetch the latest transcript, skip anything the ledger already has,
//! summarize, publish the thread, and only then record the key. Failures
//! are contained per company; the ledger write never precedes a fully
//! published thread.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::config::OrchestratorConfig;
use super::types::{OrchestratorError, SweepFailure, SweepReport};
use crate::ledger::TranscriptLedger;
use crate::publisher::{ThreadPublishError, ThreadPublisher};
use crate::source::TranscriptSource;
use crate::summarizer::{Summarizer, SummaryRequest};
use crate::universe::{Company, UniverseRegistry};

pub struct TranscriptOrchestrator {
    config: OrchestratorConfig,
    universe: Arc<UniverseRegistry>,
    source: Arc<dyn TranscriptSource>,
    ledger: Arc<dyn TranscriptLedger>,
    summarizer: Arc<dyn Summarizer>,
    publisher: ThreadPublisher,
    segment_count: u32,
}

impl TranscriptOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        universe: Arc<UniverseRegistry>,
        source: Arc<dyn TranscriptSource>,
        ledger: Arc<dyn TranscriptLedger>,
        summarizer: Arc<dyn Summarizer>,
        publisher: ThreadPublisher,
        segment_count: u32,
    ) -> Self {
        Self {
            config,
            universe,
            source,
            ledger,
            summarizer,
            publisher,
            segment_count,
        }
    }

    /// Runs one full pass over the universe and reports what happened.
    pub async fn run_sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let delay = Duration::from_millis(self.config.ticker_delay_ms);
        let total = self.universe.len();

        info!(source = self.source.name(), companies = total, "starting sweep");
        for (i, company) in self.universe.companies().enumerate() {
            self.process_company(company, &mut report).await;
            report.companies_checked += 1;
            if i + 1 < total && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        info!(
            checked = report.companies_checked,
            published = report.published,
            already_processed = report.already_processed,
            no_candidate = report.no_candidate,
            failed = report.failed(),
            "sweep finished"
        );
        report
    }

    async fn process_company(&self, company: &Company, report: &mut SweepReport) {
        debug!(symbol = %company.symbol, "checking for new transcript");

        let transcript = match self.source.fetch_latest(company).await {
            Ok(Some(transcript)) => transcript,
            Ok(None) => {
                report.no_candidate += 1;
                return;
            }
            Err(e) => {
                warn!(symbol = %company.symbol, error = %e, "transcript fetch failed");
                report.failures.push(SweepFailure {
                    symbol: company.symbol.clone(),
                    error: e.into(),
                });
                return;
            }
        };

        if self.ledger.is_processed(&transcript.key) {
            debug!(key = %transcript.key, "already published, skipping");
            report.already_processed += 1;
            return;
        }
        info!(key = %transcript.key, locator = %transcript.locator, "new transcript found");

        let request = SummaryRequest::for_transcript(company, &transcript, self.segment_count);
        let segments = match self.summarizer.summarize(&request).await {
            Ok(segments) => segments,
            Err(e) => {
                warn!(key = %transcript.key, error = %e, "summarization failed");
                report.failures.push(SweepFailure {
                    symbol: company.symbol.clone(),
                    error: e.into(),
                });
                return;
            }
        };

        let thread = match self.publisher.publish_thread(&segments).await {
            Ok(thread) => thread,
            Err(e) => {
                match &e {
                    ThreadPublishError::PostFailed {
                        ordinal, posted, ..
                    } => {
                        // The live prefix stays on the platform; the next
                        // sweep retries the whole thread.
                        error!(
                            key = %transcript.key,
                            failed_ordinal = ordinal,
                            live_posts = posted.len(),
                            "thread broke mid-publication"
                        );
                    }
                    _ => {
                        warn!(key = %transcript.key, error = %e, "thread rejected before publishing");
                    }
                }
                report.failures.push(SweepFailure {
                    symbol: company.symbol.clone(),
                    error: e.into(),
                });
                return;
            }
        };

        if let Err(e) = self
            .ledger
            .mark_processed(&transcript.key, &transcript.locator, Utc::now())
        {
            error!(
                key = %transcript.key,
                error = %e,
                "thread published but not recorded; a later sweep may repost it"
            );
            report.failures.push(SweepFailure {
                symbol: company.symbol.clone(),
                error: OrchestratorError::Ledger(e),
            });
            return;
        }

        info!(key = %transcript.key, posts = thread.len(), "summary thread published");
        report.published += 1;
    }
}
