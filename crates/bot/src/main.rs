use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use callthread_core::{
    load_config, validate_config, CalendarApiSource, JsonFileLedger, OpenAiSummarizer,
    PostGateway, RunMode, Scheduler, Summarizer, ThreadPublisher, TranscriptLedger,
    TranscriptOrchestrator, TranscriptSource, TwitterGateway, UniverseRegistry,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "\
callthread - earnings call summary thread bot

Usage: callthread [OPTIONS]

Options:
  -c, --config <PATH>  Config file (default: config.toml, env: CALLTHREAD_CONFIG)
      --once           Run a single sweep and exit, regardless of configured mode
  -h, --help           Print this help
";

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    config_path: Option<PathBuf>,
    once: bool,
    help: bool,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let value = args.next().context("--config requires a path")?;
                parsed.config_path = Some(PathBuf::from(value));
            }
            "--once" => parsed.once = true,
            "--help" | "-h" => parsed.help = true,
            other => bail!("Unrecognized argument: {other} (try --help)"),
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        print!("{USAGE}");
        return Ok(());
    }

    // Determine config path: flag, then environment, then default
    let config_path = args
        .config_path
        .or_else(|| std::env::var("CALLTHREAD_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Starting callthread v{}", VERSION);

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration loaded successfully");

    // Load the ticker universe
    let universe = Arc::new(
        UniverseRegistry::load(&config.universe.path)
            .with_context(|| format!("Failed to load universe from {:?}", config.universe.path))?,
    );
    info!("Universe loaded: {} companies", universe.len());

    // Open the processed-transcript ledger
    let ledger: Arc<dyn TranscriptLedger> = Arc::new(
        JsonFileLedger::load(&config.ledger.path)
            .with_context(|| format!("Failed to open ledger at {:?}", config.ledger.path))?,
    );
    info!(
        "Ledger opened: {} transcripts already processed",
        ledger.len()
    );

    // Create the transcript source
    let source: Arc<dyn TranscriptSource> = Arc::new(
        CalendarApiSource::new(config.source.clone())
            .context("Failed to create transcript source")?,
    );
    info!("Transcript source: {}", source.name());

    // Create the summarizer
    let summarizer: Arc<dyn Summarizer> = Arc::new(
        OpenAiSummarizer::new(config.summarizer.clone()).context("Failed to create summarizer")?,
    );
    info!("Summarizer: {}", summarizer.name());

    // Create the post gateway and thread publisher
    let gateway: Arc<dyn PostGateway> = Arc::new(
        TwitterGateway::new(config.publisher.clone()).context("Failed to create post gateway")?,
    );
    info!("Post gateway: {}", gateway.name());
    let publisher = ThreadPublisher::new(Arc::clone(&gateway), &config.publisher);

    // Create the orchestrator
    let orchestrator = Arc::new(TranscriptOrchestrator::new(
        config.orchestrator.clone(),
        universe,
        source,
        ledger,
        summarizer,
        publisher,
        config.summarizer.segment_count,
    ));

    // --once overrides the configured run mode
    let mut scheduler_config = config.scheduler.clone();
    if args.once {
        scheduler_config.mode = RunMode::Once;
    }

    let scheduler = Arc::new(Scheduler::from_config(orchestrator, &scheduler_config));
    let shutdown = scheduler.shutdown_handle();

    // Run the scheduler until it finishes or a signal stops it
    let mut run_task = tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        async move { scheduler.run().await }
    });

    tokio::select! {
        res = &mut run_task => {
            res.context("Scheduler task panicked")?;
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, stopping scheduler...");
            shutdown.stop();
            run_task.await.context("Scheduler task panicked")?;
        }
    }

    let status = scheduler.status();
    info!("Stopped after {} sweeps", status.sweeps_completed);

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
