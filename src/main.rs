//! Vigia - Predictive Maintenance Monitor
//!
//! Threshold alerting and degradation simulation for rotating-equipment
//! telemetry, with an HTTP API over the shared monitoring session.
//!
//! # Usage
//!
//! ```bash
//! # Monitor a synthetic degradation walk (default input)
//! cargo run --release
//!
//! # Replay recorded telemetry from a CSV export
//! cargo run --release -- --source csv --csv-path telemetry.csv
//!
//! # Attach a degradation scenario to every cycle
//! cargo run --release -- --scenario overheat
//! ```
//!
//! # Environment Variables
//!
//! - `VIGIA_CONFIG`: Path to a TOML config file (checked before ./vigia.toml)
//! - `VIGIA_SERVER_ADDR`: HTTP bind address (overridden by --bind)
//! - `VIGIA_CORS_ORIGINS`: Comma-separated allowed CORS origins
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use vigia::api::create_app;
use vigia::config::{self, MonitorConfig};
use vigia::pipeline::{
    CsvSource, MonitorState, ProcessingLoop, SampleSource, SyntheticSource,
};
use vigia::types::ScenarioKind;

// ============================================================================
// CLI
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "vigia", version, about = "Predictive maintenance monitor")]
struct CliArgs {
    /// Path to a TOML config file (skips the VIGIA_CONFIG / ./vigia.toml search)
    #[arg(long, value_name = "PATH")]
    config: Option<String>,

    /// HTTP bind address, e.g. 0.0.0.0:8080
    #[arg(short, long)]
    bind: Option<String>,

    /// Where metric batches come from
    #[arg(long, value_enum, default_value_t = SourceArg::Synthetic)]
    source: SourceArg,

    /// CSV file to replay (required with --source csv)
    #[arg(long, value_name = "PATH")]
    csv_path: Option<String>,

    /// Seed for the synthetic degradation walk
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Delay between metric batches in milliseconds
    #[arg(long, default_value = "1000")]
    batch_delay_ms: u64,

    /// Degradation scenario to project on every cycle
    #[arg(long, value_name = "KIND")]
    scenario: Option<String>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum SourceArg {
    /// Replay recorded telemetry from a CSV file
    Csv,
    /// Deterministic synthetic degradation walk
    Synthetic,
}

// ============================================================================
// Task Names
// ============================================================================

/// Identifies each supervised task for shutdown reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskName {
    HttpServer,
    CycleRunner,
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskName::HttpServer => write!(f, "HttpServer"),
            TaskName::CycleRunner => write!(f, "CycleRunner"),
        }
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let cfg = match args.config.as_deref() {
        Some(path) => MonitorConfig::load_from_file(std::path::Path::new(path))
            .with_context(|| format!("failed to load config from {}", path))?,
        None => MonitorConfig::load(),
    };

    // Reject a bad scenario name before any task starts.
    let scenario = match args.scenario.as_deref() {
        Some(raw) => match ScenarioKind::from_str(raw) {
            Some(kind) => Some(kind),
            None => {
                let valid: Vec<String> =
                    ScenarioKind::ALL.iter().map(|k| k.to_string()).collect();
                bail!("unknown scenario '{}' (valid: {})", raw, valid.join(", "));
            }
        },
        None => None,
    };

    info!(
        "Equipment: {} | Rules: {} | Default hours: {:.0}",
        cfg.equipment.id,
        cfg.rules.len(),
        cfg.equipment.default_operating_hours
    );

    config::init(cfg);

    let server_addr = args
        .bind
        .clone()
        .or_else(|| std::env::var("VIGIA_SERVER_ADDR").ok())
        .unwrap_or_else(|| config::get().server.addr.clone());

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("   Vigia - Predictive Maintenance Monitor");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let cancel_token = CancellationToken::new();
    let mut task_set: JoinSet<Result<TaskName>> = JoinSet::new();

    // Spawn Ctrl+C handler
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("");
            info!("🛑 Shutdown signal received, stopping all tasks...");
            shutdown_token.cancel();
        }
    });

    let state = MonitorState::from_config().context("failed to build monitoring state")?;

    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("failed to bind HTTP server to {}", server_addr))?;
    info!("🌐 HTTP API listening on {}", server_addr);

    let app = create_app(state.clone());
    spawn_http_server(&mut task_set, listener, app, cancel_token.clone());

    match args.source {
        SourceArg::Csv => {
            let Some(path) = args.csv_path.as_deref() else {
                bail!("--source csv requires --csv-path");
            };
            let source = CsvSource::from_path(path, args.batch_delay_ms);
            if source.batch_count() == 0 {
                bail!("no metric samples found in {}", path);
            }
            info!(
                "📄 Input: CSV replay from {} ({} batches queued)",
                path,
                source.batch_count()
            );
            spawn_cycle_runner(&mut task_set, source, state, scenario, cancel_token.clone());
        }
        SourceArg::Synthetic => {
            info!("🧪 Input: synthetic degradation walk (seed {})", args.seed);
            let source = SyntheticSource::new(args.seed, args.batch_delay_ms);
            spawn_cycle_runner(&mut task_set, source, state, scenario, cancel_token.clone());
        }
    }

    run_supervisor(&mut task_set, cancel_token).await?;

    info!("");
    info!("✓ Vigia shutdown complete");
    Ok(())
}

// ============================================================================
// Task Spawning
// ============================================================================

fn spawn_http_server(
    task_set: &mut JoinSet<Result<TaskName>>,
    listener: tokio::net::TcpListener,
    app: axum::Router,
    cancel_token: CancellationToken,
) {
    task_set.spawn(async move {
        info!("[HttpServer] Task starting");
        let shutdown = cancel_token.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                info!("[HttpServer] Graceful shutdown initiated");
            })
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;
        Ok(TaskName::HttpServer)
    });
}

fn spawn_cycle_runner<S: SampleSource>(
    task_set: &mut JoinSet<Result<TaskName>>,
    mut source: S,
    state: MonitorState,
    scenario: Option<ScenarioKind>,
    cancel_token: CancellationToken,
) {
    task_set.spawn(async move {
        info!("[CycleRunner] Task starting");
        let stats = ProcessingLoop::new(state, scenario, cancel_token)
            .run(&mut source)
            .await;
        info!(
            "[CycleRunner] Finished: {} batches, {} alerts",
            stats.batches_processed, stats.alerts_emitted
        );
        Ok(TaskName::CycleRunner)
    });
}

// ============================================================================
// Supervisor
// ============================================================================

/// Wait for every task, cancelling the rest when one fails or panics.
async fn run_supervisor(
    task_set: &mut JoinSet<Result<TaskName>>,
    cancel_token: CancellationToken,
) -> Result<()> {
    while let Some(joined) = task_set.join_next().await {
        match joined {
            Ok(Ok(name)) => {
                info!("[Supervisor] {} completed cleanly", name);
            }
            Ok(Err(e)) => {
                error!("[Supervisor] Task failed: {:#}", e);
                cancel_token.cancel();
                return Err(e);
            }
            Err(e) => {
                error!("[Supervisor] Task panicked: {}", e);
                cancel_token.cancel();
                bail!("task panicked: {}", e);
            }
        }
    }
    Ok(())
}
