//! `ploop init` — Report driver availability.

use clap::Args;
use ploopflex_common::types::Response;
use ploopflex_core::plugin::FlexVolume;

/// Arguments for the `init` verb.
#[derive(Args, Debug)]
pub struct InitArgs {}

/// Executes the `init` verb.
pub fn execute(_args: &InitArgs, driver: &dyn FlexVolume) -> Response {
    driver.init()
}
