//! Tracing setup: always stderr, plus an append-only log file when asked for.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// `YYYYMMDD_arbitrager.log` for `date`.
#[must_use]
pub fn dated_file_name(date: NaiveDate) -> String {
    format!("{}_arbitrager.log", date.format("%Y%m%d"))
}

/// An explicit `log_file` wins; otherwise `log_dir` gets a dated file.
#[must_use]
pub fn resolve_log_path(
    log_file: Option<&Path>,
    log_dir: Option<&Path>,
    today: NaiveDate,
) -> Option<PathBuf> {
    log_file
        .map(Path::to_path_buf)
        .or_else(|| log_dir.map(|dir| dir.join(dated_file_name(today))))
}

/// Builds the subscriber: `RUST_LOG` filter (default `info`), a stderr layer,
/// and a plain-text file layer when `log_path` is set.
///
/// # Errors
/// Returns an error if the log file or its directory cannot be created.
pub fn subscriber(log_path: Option<&Path>) -> Result<impl Subscriber + Send + Sync + 'static> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match log_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        }
        None => None,
    };

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer))
}

/// Installs [`subscriber`] as the global default.
///
/// # Errors
/// Returns an error if the log file cannot be opened.
pub fn init(log_path: Option<&Path>) -> Result<()> {
    subscriber(log_path)?.init();
    Ok(())
}
