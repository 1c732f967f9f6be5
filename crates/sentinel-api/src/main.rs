//! Sentinel
//!
//! Scam message detection service and command-line tools.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use sentinel_api::{create_router, init_detector, AppState, ServiceConfig};
use sentinel_classifiers::{ScamDetector, TrainingSet};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "sentinel")]
#[command(about = "Sentinel scam message detector", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "sentinel.yaml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Listen address
        #[arg(short = 'l', long)]
        listen: Option<String>,

        /// Listen port
        #[arg(short = 'P', long)]
        port: Option<u16>,

        /// Saved model bundle
        #[arg(short, long, env = "SENTINEL_MODEL_PATH")]
        model_path: Option<PathBuf>,

        /// Train on the canonical corpus when no model file exists
        #[arg(long)]
        train_if_missing: bool,
    },

    /// Train the ensemble and save the model bundle
    Train {
        /// JSON or YAML dataset with `messages` and `labels`; defaults to the
        /// canonical corpus
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Output path; defaults to the configured model path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Classify messages and print the results as JSON
    Detect {
        /// Messages to classify
        #[arg(required = true)]
        messages: Vec<String>,

        /// Saved model bundle; defaults to the configured model path
        #[arg(short, long)]
        model: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = ServiceConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;

    match cli.command {
        Command::Serve {
            listen,
            port,
            model_path,
            train_if_missing,
        } => {
            if let Some(listen) = listen {
                config.listen = listen;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(model_path) = model_path {
                config.model_path = model_path;
            }
            config.train_if_missing |= train_if_missing;
            serve(config).await
        }
        Command::Train { data, output } => train(config, data, output),
        Command::Detect { messages, model } => detect(config, &messages, model),
    }
}

async fn serve(config: ServiceConfig) -> Result<()> {
    info!("Starting Sentinel API");

    let metrics_handle = init_metrics()?;

    let detector = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || init_detector(&config)).await??
    };
    info!("Detector ready (trained: {})", detector.is_trained());

    let addr: SocketAddr = format!("{}:{}", config.listen, config.port).parse()?;
    let state = AppState::with_detector(config, detector, Some(metrics_handle));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn train(config: ServiceConfig, data: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let corpus = match &data {
        Some(path) => TrainingSet::from_file(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?,
        None => TrainingSet::canonical(),
    };
    let output = output.unwrap_or(config.model_path);

    info!(
        "Training on {} messages ({} scam)",
        corpus.len(),
        corpus.scam_count()
    );
    let mut detector = ScamDetector::new(config.detector)?;
    let summary = detector.train(&corpus.messages, &corpus.labels)?;
    let report = detector.evaluate(&corpus.messages, &corpus.labels)?;
    detector.save(&output)?;

    println!("Training samples:  {}", summary.samples);
    println!("Vocabulary size:   {}", summary.vocabulary_size);
    println!("Training accuracy: {:.2}%", report.accuracy * 100.0);
    println!("Model saved to:    {}", output.display());
    Ok(())
}

fn detect(config: ServiceConfig, messages: &[String], model: Option<PathBuf>) -> Result<()> {
    let model = model.unwrap_or(config.model_path);
    let detector = ScamDetector::from_file(config.detector, &model)
        .with_context(|| format!("Failed to load model {}", model.display()))?;

    let results = detector.detect_batch(messages);
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("sentinel=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("sentinel=info,tower_http=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use sentinel_telemetry::metrics::{DETECTIONS_TOTAL, DETECTION_LATENCY_US, REQUESTS_TOTAL};

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(REQUESTS_TOTAL, "Total number of API requests by endpoint");
    metrics::describe_counter!(
        DETECTIONS_TOTAL,
        "Total number of detections by verdict"
    );
    metrics::describe_histogram!(
        DETECTION_LATENCY_US,
        metrics::Unit::Microseconds,
        "Detection latency in microseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
