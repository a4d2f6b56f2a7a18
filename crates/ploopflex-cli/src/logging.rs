//! Tracing setup.
//!
//! Stdout carries the JSON response, so events go to the configured log
//! file as JSON lines, or to stderr when no file is set. A broken log
//! setup never fails a verb; it falls back to stderr.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use ploopflex_common::config::DriverConfig;
use ploopflex_common::constants::DEFAULT_LOG_FILTER;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber described by `config`.
///
/// # Errors
///
/// Returns an error if the filter is invalid or the log file cannot be
/// opened.
pub fn init(config: &DriverConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .with_context(|| format!("invalid log filter {:?}", config.log_filter))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false);

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder
                .json()
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        None => {
            builder
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
    }
    Ok(())
}

/// Installs the subscriber described by `config`, or a stderr subscriber
/// if that fails.
#[allow(clippy::print_stderr)]
pub fn init_or_fallback(config: &DriverConfig) {
    let Err(err) = init(config) else {
        return;
    };
    eprintln!("ploop: logging setup failed, logging to stderr: {err:#}");

    let filter = EnvFilter::try_new(&config.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init();
}
