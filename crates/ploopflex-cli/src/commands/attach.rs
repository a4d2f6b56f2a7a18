//! `ploop attach` — Create the ploop volume if it does not exist.

use clap::Args;
use ploopflex_common::types::Response;
use ploopflex_core::plugin::FlexVolume;

use crate::output;

/// Arguments for the `attach` verb.
#[derive(Args, Debug)]
pub struct AttachArgs {
    /// JSON object with `volumePath`, `volumeId`, and `size`.
    pub options: String,

    /// Node name appended by newer kubelets; unused.
    pub node: Option<String>,
}

/// Executes the `attach` verb.
pub fn execute(args: &AttachArgs, driver: &dyn FlexVolume) -> Response {
    match output::parse_options(&args.options) {
        Ok(options) => driver.attach(&options),
        Err(err) => Response::failure(err.to_string()),
    }
}
