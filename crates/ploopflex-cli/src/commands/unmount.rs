//! `ploop unmount` — Unmount the volume from a pod directory.

use std::path::PathBuf;

use clap::Args;
use ploopflex_common::types::Response;
use ploopflex_core::plugin::FlexVolume;

/// Arguments for the `unmount` verb.
#[derive(Args, Debug)]
pub struct UnmountArgs {
    /// Pod directory the volume is mounted on.
    pub mount: PathBuf,
}

/// Executes the `unmount` verb.
pub fn execute(args: &UnmountArgs, driver: &dyn FlexVolume) -> Response {
    driver.unmount(&args.mount)
}
