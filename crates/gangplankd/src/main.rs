//! gangplankd — the Gangplank scheduling daemon.
//!
//! # Usage
//!
//! ```text
//! gangplankd run --config gangplank.toml --units pending.jsonl
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::watch;
use tracing::{error, info};

use gangplank_core::GangplankConfig;
use gangplank_scheduler::SchedulerError;
use gangplankd::{Daemon, serve_metrics};

#[derive(Parser)]
#[command(name = "gangplankd", about = "Gang-aware scheduler for driver/executor workloads")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Warm up, then schedule pending units until the unit stream ends.
    Run {
        /// Path to gangplank.toml.
        #[arg(long)]
        config: PathBuf,

        /// JSON-lines file of pending units (defaults to stdin).
        #[arg(long)]
        units: Option<PathBuf>,

        /// Override the metrics listen address.
        #[arg(long)]
        metrics_listen: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,gangplank=debug,gangplankd=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            units,
            metrics_listen,
        } => run(config, units, metrics_listen).await,
    }
}

async fn run(
    config_path: PathBuf,
    units_path: Option<PathBuf>,
    metrics_listen: Option<String>,
) -> anyhow::Result<()> {
    let config = GangplankConfig::from_file(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    info!(
        path = %config_path.display(),
        scheduler_name = %config.scheduler_name,
        nodes = config.nodes.len(),
        "gangplank daemon starting"
    );

    let listen = metrics_listen.unwrap_or_else(|| config.metrics.listen.clone());
    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("invalid metrics listen address {listen:?}"))?;

    let units: Box<dyn AsyncBufRead + Unpin + Send> = match &units_path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                let _ = signal_tx.send(true);
            }
            Err(e) => error!(error = %e, "failed to install CTRL+C handler"),
        }
    });

    // ── Metrics endpoint ───────────────────────────────────────

    let daemon = Daemon::new(config);
    let metrics_handle = tokio::spawn(serve_metrics(addr, daemon.metrics(), shutdown_rx.clone()));

    // ── Scheduling ─────────────────────────────────────────────

    let result = daemon.run(units, shutdown_rx).await;
    let _ = shutdown_tx.send(true);

    if let Err(e) = metrics_handle.await? {
        error!(error = %e, "metrics endpoint failed");
    }

    match result {
        Ok(report) => {
            info!(
                units = report.feed.accepted,
                bound = report.binder.delivered,
                events = report.emitter.delivered,
                "gangplank daemon stopped"
            );
            Ok(())
        }
        Err(e) if matches!(e.downcast_ref::<SchedulerError>(), Some(SchedulerError::Cancelled)) => {
            info!("gangplank daemon stopped during warm-up");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
