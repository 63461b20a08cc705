//! Runs the arbitrage loop against paper venues.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arbitrager_core::ConfigLoader;
use arbitrager_engine::{Arbitrager, ThresholdDealMaker, TracingReporter};
use arbitrager_exchange_paper::PaperExchange;
use clap::Args;
use tokio::sync::watch;
use tracing::info;

/// Arguments for the run command.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: PathBuf,

    /// Also append logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Also append logs to a dated `YYYYMMDD_arbitrager.log` in this directory
    #[arg(long, conflicts_with = "log_file")]
    pub log_dir: Option<PathBuf>,
}

impl RunArgs {
    /// Where the log file goes today, if anywhere.
    #[must_use]
    pub fn log_path(&self) -> Option<PathBuf> {
        crate::logging::resolve_log_path(
            self.log_file.as_deref(),
            self.log_dir.as_deref(),
            chrono::Local::now().date_naive(),
        )
    }
}

/// Runs the arbitrager until Ctrl+C.
///
/// # Errors
/// Returns an error if the config cannot be loaded or the loop stops on an
/// unrecoverable error.
pub async fn run_arbitrager(args: RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");
    let config = ConfigLoader::load(&args.config)?;

    let exchange = Arc::new(PaperExchange::from_config(&config));
    let mut arbitrager = Arbitrager::new(
        config,
        exchange.clone(),
        Arc::new(ThresholdDealMaker::new()),
        exchange,
        Arc::new(TracingReporter::new()),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received, shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    arbitrager
        .run(shutdown_rx)
        .await
        .context("arbitrager stopped on an unrecoverable error")?;

    let open = arbitrager.ledger().len();
    if open > 0 {
        info!(open, "Open positions left unclosed");
    }
    Ok(())
}
