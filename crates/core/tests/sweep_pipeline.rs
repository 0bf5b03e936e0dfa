//! Sweep pipeline integration tests.
//!
//! These tests drive the orchestrator end to end over mock adapters and a
//! real on-disk ledger: fetch -> dedup -> summarize -> publish -> mark.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;

use callthread_core::{
    testing::{fixtures, MockLedger, MockPostGateway, MockSummarizer, MockTranscriptSource},
    JsonFileLedger, OrchestratorConfig, PostGateway, PublisherConfig, Summarizer, SweepStage,
    ThreadPublisher, TranscriptLedger, TranscriptOrchestrator, TranscriptSource, UniverseRegistry,
};

const SEGMENT_COUNT: u32 = 5;

/// Test helper holding the orchestrator's dependencies.
struct TestHarness {
    universe: Arc<UniverseRegistry>,
    source: Arc<MockTranscriptSource>,
    summarizer: Arc<MockSummarizer>,
    gateway: Arc<MockPostGateway>,
    ledger: Arc<JsonFileLedger>,
    ledger_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new(symbols: &[&str]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let ledger_path = temp_dir.path().join("ledger.json");
        let ledger =
            Arc::new(JsonFileLedger::load(&ledger_path).expect("Failed to create ledger"));

        Self {
            universe: Arc::new(fixtures::universe(symbols)),
            source: Arc::new(MockTranscriptSource::new()),
            summarizer: Arc::new(MockSummarizer::new()),
            gateway: Arc::new(MockPostGateway::new()),
            ledger,
            ledger_path,
            _temp_dir: temp_dir,
        }
    }

    fn create_orchestrator(&self) -> TranscriptOrchestrator {
        self.orchestrator_with_ledger(Arc::clone(&self.ledger) as Arc<dyn TranscriptLedger>)
    }

    fn orchestrator_with_ledger(
        &self,
        ledger: Arc<dyn TranscriptLedger>,
    ) -> TranscriptOrchestrator {
        let publisher = ThreadPublisher::new(
            Arc::clone(&self.gateway) as Arc<dyn PostGateway>,
            &publisher_config(),
        );

        TranscriptOrchestrator::new(
            OrchestratorConfig { ticker_delay_ms: 0 },
            Arc::clone(&self.universe),
            Arc::clone(&self.source) as Arc<dyn TranscriptSource>,
            ledger,
            Arc::clone(&self.summarizer) as Arc<dyn Summarizer>,
            publisher,
            SEGMENT_COUNT,
        )
    }

    /// Fresh ledger handle from the same file, as a restarted process sees it.
    fn reload_ledger(&self) -> Arc<JsonFileLedger> {
        Arc::new(JsonFileLedger::load(&self.ledger_path).expect("Failed to reload ledger"))
    }
}

fn publisher_config() -> PublisherConfig {
    PublisherConfig {
        api_base: "https://post.invalid".to_string(),
        bearer_token: "test-token".to_string(),
        max_post_chars: 280,
        post_delay_ms: 0,
        timeout_secs: 5,
    }
}

// =============================================================================
// Happy path
// =============================================================================

#[tokio::test]
async fn test_new_transcripts_are_published_and_marked() {
    let harness = TestHarness::new(&["AAPL", "MSFT"]);

    harness
        .source
        .set_latest(fixtures::transcript("AAPL", "Q3", "2024"))
        .await;
    harness
        .source
        .set_latest(fixtures::transcript("MSFT", "Q3", "2024"))
        .await;

    let report = harness.create_orchestrator().run_sweep().await;

    assert_eq!(report.companies_checked, 2);
    assert_eq!(report.published, 2);
    assert_eq!(report.failed(), 0);

    // One thread per company, in universe order.
    let posts = harness.gateway.posts().await;
    assert_eq!(posts.len(), 2 * SEGMENT_COUNT as usize);

    let (aapl_thread, msft_thread) = posts.split_at(SEGMENT_COUNT as usize);
    for thread in [aapl_thread, msft_thread] {
        assert_eq!(thread[0].in_reply_to, None, "Root post must have no parent");
        for pair in thread.windows(2) {
            assert_eq!(
                pair[1].in_reply_to,
                Some(pair[0].id.clone()),
                "Each reply must point at the previous post"
            );
        }
    }
    assert!(aapl_thread[0].text.contains("AAPL"));
    assert!(msft_thread[0].text.contains("MSFT"));

    // Both marked processed, exactly once each.
    assert_eq!(harness.ledger.len(), 2);
    assert!(harness
        .ledger
        .is_processed(&fixtures::key("AAPL", "Q3", "2024")));
    assert!(harness
        .ledger
        .is_processed(&fixtures::key("MSFT", "Q3", "2024")));
}

// =============================================================================
// Deduplication
// =============================================================================

#[tokio::test]
async fn test_processed_transcript_is_skipped() {
    let harness = TestHarness::new(&["AAPL"]);

    let transcript = fixtures::transcript("AAPL", "Q3", "2024");
    harness
        .ledger
        .mark_processed(&transcript.key, &transcript.locator, Utc::now())
        .expect("Failed to seed ledger");
    harness.source.set_latest(transcript).await;

    let report = harness.create_orchestrator().run_sweep().await;

    assert_eq!(report.already_processed, 1);
    assert_eq!(report.published, 0);

    // The source was consulted (the key comes from its reply) but nothing
    // downstream ran.
    assert_eq!(harness.source.fetch_count().await, 1);
    assert_eq!(harness.summarizer.request_count().await, 0);
    assert_eq!(harness.gateway.call_count().await, 0);
    assert_eq!(harness.ledger.len(), 1);
}

#[tokio::test]
async fn test_dedup_survives_restart() {
    let harness = TestHarness::new(&["AAPL"]);

    harness
        .source
        .set_latest(fixtures::transcript("AAPL", "Q3", "2024"))
        .await;

    let report = harness.create_orchestrator().run_sweep().await;
    assert_eq!(report.published, 1);
    let posts_after_first_sweep = harness.gateway.call_count().await;

    // Same universe, same source reply, but a ledger reloaded from disk.
    let reloaded = harness.reload_ledger();
    assert_eq!(reloaded.len(), 1);

    let report = harness
        .orchestrator_with_ledger(reloaded as Arc<dyn TranscriptLedger>)
        .run_sweep()
        .await;

    assert_eq!(report.already_processed, 1);
    assert_eq!(report.published, 0);
    assert_eq!(harness.gateway.call_count().await, posts_after_first_sweep);
}

// =============================================================================
// Failure containment
// =============================================================================

#[tokio::test]
async fn test_failing_company_does_not_stop_the_sweep() {
    let harness = TestHarness::new(&["AAA", "BBB", "CCC", "DDD", "EEE"]);

    for symbol in ["AAA", "BBB", "CCC", "DDD", "EEE"] {
        harness
            .source
            .set_latest(fixtures::transcript(symbol, "Q1", "2025"))
            .await;
    }
    harness.source.set_error(&fixtures::symbol("CCC")).await;

    let report = harness.create_orchestrator().run_sweep().await;

    assert_eq!(report.companies_checked, 5);
    assert_eq!(report.published, 4);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].symbol, fixtures::symbol("CCC"));
    assert_eq!(report.failures[0].stage(), SweepStage::Fetch);

    // Every company was still attempted.
    assert_eq!(harness.source.fetch_count().await, 5);
    assert_eq!(harness.ledger.len(), 4);
    assert!(!harness
        .ledger
        .is_processed(&fixtures::key("CCC", "Q1", "2025")));
}

#[tokio::test]
async fn test_summarize_failure_leaves_company_unmarked() {
    let harness = TestHarness::new(&["AAPL"]);

    harness
        .source
        .set_latest(fixtures::transcript("AAPL", "Q3", "2024"))
        .await;
    harness
        .summarizer
        .set_error_for(&fixtures::symbol("AAPL"))
        .await;

    let report = harness.create_orchestrator().run_sweep().await;

    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].stage(), SweepStage::Summarize);
    assert_eq!(harness.gateway.call_count().await, 0);
    assert!(harness.ledger.is_empty());

    // Nothing was recorded, so the next sweep picks the transcript up again.
    harness
        .summarizer
        .clear_error_for(&fixtures::symbol("AAPL"))
        .await;

    let report = harness.create_orchestrator().run_sweep().await;
    assert_eq!(report.published, 1);
    assert!(harness
        .ledger
        .is_processed(&fixtures::key("AAPL", "Q3", "2024")));
}

// =============================================================================
// Partial publication and retry
// =============================================================================

#[tokio::test]
async fn test_partial_thread_failure_retries_whole_thread_next_sweep() {
    let harness = TestHarness::new(&["AAPL"]);

    harness
        .source
        .set_latest(fixtures::transcript("AAPL", "Q3", "2024"))
        .await;
    // Segment 3 of 5 will be rejected by the platform.
    harness.gateway.fail_on_call(3).await;

    let report = harness.create_orchestrator().run_sweep().await;

    assert_eq!(report.published, 0);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].stage(), SweepStage::Publish);

    // Two posts went live before the failure; the transcript stays unmarked.
    assert_eq!(harness.gateway.posts().await.len(), 2);
    assert!(harness.ledger.is_empty());

    // Next sweep retries the whole thread from the first segment.
    let report = harness.create_orchestrator().run_sweep().await;

    assert_eq!(report.published, 1);
    assert_eq!(report.failed(), 0);

    let posts = harness.gateway.posts().await;
    assert_eq!(posts.len(), 2 + SEGMENT_COUNT as usize);

    // The retried thread is self-contained: rooted fresh, not chained onto
    // the orphaned prefix from the failed attempt.
    let retried = &posts[2..];
    assert_eq!(retried[0].in_reply_to, None);
    for pair in retried.windows(2) {
        assert_eq!(pair[1].in_reply_to, Some(pair[0].id.clone()));
    }

    // Marked exactly once despite two attempts.
    assert_eq!(harness.ledger.len(), 1);
    assert!(harness
        .ledger
        .is_processed(&fixtures::key("AAPL", "Q3", "2024")));
}

#[tokio::test]
async fn test_mark_failure_is_reported_and_leaves_retry_open() {
    let harness = TestHarness::new(&["AAPL"]);

    harness
        .source
        .set_latest(fixtures::transcript("AAPL", "Q3", "2024"))
        .await;

    let ledger = Arc::new(MockLedger::new());
    ledger.fail_next_mark();

    let report = harness
        .orchestrator_with_ledger(Arc::clone(&ledger) as Arc<dyn TranscriptLedger>)
        .run_sweep()
        .await;

    // The thread went out, but the bookkeeping write failed.
    assert_eq!(report.published, 0);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].stage(), SweepStage::Ledger);
    assert_eq!(harness.gateway.posts().await.len(), SEGMENT_COUNT as usize);
    assert!(ledger.is_empty());

    // The unmarked transcript is republished next sweep and then recorded.
    let report = harness
        .orchestrator_with_ledger(Arc::clone(&ledger) as Arc<dyn TranscriptLedger>)
        .run_sweep()
        .await;

    assert_eq!(report.published, 1);
    assert_eq!(harness.gateway.posts().await.len(), 2 * SEGMENT_COUNT as usize);
    assert_eq!(ledger.len(), 1);
}

// =============================================================================
// Sweep report
// =============================================================================

#[tokio::test]
async fn test_report_counts_cover_every_company() {
    let harness = TestHarness::new(&["AAPL", "MSFT", "GOOG", "NVDA"]);

    // AAPL: fresh transcript. MSFT: nothing new. GOOG: already processed.
    // NVDA: source error.
    harness
        .source
        .set_latest(fixtures::transcript("AAPL", "Q2", "2025"))
        .await;
    let goog = fixtures::transcript("GOOG", "Q2", "2025");
    harness
        .ledger
        .mark_processed(&goog.key, &goog.locator, Utc::now())
        .expect("Failed to seed ledger");
    harness.source.set_latest(goog).await;
    harness.source.set_error(&fixtures::symbol("NVDA")).await;

    let report = harness.create_orchestrator().run_sweep().await;

    assert_eq!(report.companies_checked, 4);
    assert_eq!(report.published, 1);
    assert_eq!(report.no_candidate, 1);
    assert_eq!(report.already_processed, 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(
        report.published + report.no_candidate + report.already_processed + report.failed(),
        report.companies_checked
    );
}
