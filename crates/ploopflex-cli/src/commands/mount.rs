//! `ploop mount` — Mount the volume into a pod directory.
//!
//! Accepts both `mount <target> <device> <json>` and the newer
//! `mount <target> <json>`.

use std::path::PathBuf;

use clap::Args;
use ploopflex_common::types::Response;
use ploopflex_core::plugin::FlexVolume;

use crate::output;

/// Arguments for the `mount` verb.
#[derive(Args, Debug)]
pub struct MountArgs {
    /// Pod directory to mount on.
    pub target: PathBuf,

    /// Optional device followed by the JSON options object.
    #[arg(required = true, num_args = 1..=2)]
    pub rest: Vec<String>,
}

impl MountArgs {
    /// Splits the trailing arguments into `(device, options)`.
    fn device_and_options(&self) -> (&str, &str) {
        match self.rest.as_slice() {
            [device, options] => (device.as_str(), options.as_str()),
            [options] => ("", options.as_str()),
            _ => ("", ""),
        }
    }
}

/// Executes the `mount` verb.
pub fn execute(args: &MountArgs, driver: &dyn FlexVolume) -> Response {
    let (device, raw) = args.device_and_options();
    match output::parse_options(raw) {
        Ok(options) => driver.mount(&args.target, device, &options),
        Err(err) => Response::failure(err.to_string()).with_device(device),
    }
}
