//! # ploop — flexvolume driver for ploop volumes
//!
//! The kubelet runs this binary once per verb. Every invocation prints a
//! single JSON response on stdout and exits 0; success or failure lives in
//! the response body.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

mod commands;
mod logging;
mod output;

use clap::Parser;
use clap::error::ErrorKind;
use ploopflex_common::config::DriverConfig;
use ploopflex_common::types::Response;
use ploopflex_core::driver::PloopDriver;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    let response = run();
    output::print_response(&response)
}

fn run() -> Response {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => err.exit(),
            _ => return Response::failure(err.to_string().trim()),
        },
    };

    let (config, config_error) = match DriverConfig::from_env() {
        Ok(config) => (config, None),
        Err(err) => (DriverConfig::default(), Some(err)),
    };
    logging::init_or_fallback(&config);
    tracing::debug!(?config, "driver configuration loaded");

    if let Some(err) = config_error {
        if cli.command.uses_backend() {
            tracing::warn!(error = %err, "invalid configuration");
            return Response::failure(err.to_string());
        }
        tracing::warn!(error = %err, "invalid configuration, using defaults");
    }

    tracing::debug!(command = ?cli.command, "dispatching verb");
    let driver = PloopDriver::from_config(&config);
    commands::execute(cli, &driver)
}
