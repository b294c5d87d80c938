use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use prover_api::{build_router, AppState};
use prover_common::{telemetry, Config};

#[derive(Parser)]
#[command(name = "prover", about = "SNARK submission tracker")]
struct Cli {
    /// Path to an optional config TOML file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    telemetry::init_tracing(config.log_format);
    info!("Starting prover");

    let state = Arc::new(AppState::with_max_journal_entries(config.journal_max_entries));
    let app = build_router(state.clone(), &config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Prover API listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let snapshot = state.kernel.snapshot().await;
    let restored = state
        .journal
        .restore()
        .context("Failed to replay command journal")?;
    if restored != *snapshot {
        warn!("Command journal does not reproduce the committed snapshot");
    }
    info!(
        records = snapshot.len(),
        next_id = snapshot.next_id(),
        journaled = state.journal.len(),
        checkpointed = state.journal.checkpoint().len(),
        "Prover stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
