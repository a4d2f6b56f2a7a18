//! `ploop detach` — Release the ploop device.

use clap::Args;
use ploopflex_common::types::Response;
use ploopflex_core::plugin::FlexVolume;

/// Arguments for the `detach` verb.
#[derive(Args, Debug)]
pub struct DetachArgs {
    /// Device returned by `attach` or `mount`.
    pub device: String,

    /// Node name appended by newer kubelets; unused.
    pub node: Option<String>,
}

/// Executes the `detach` verb.
pub fn execute(args: &DetachArgs, driver: &dyn FlexVolume) -> Response {
    driver.detach(&args.device)
}
