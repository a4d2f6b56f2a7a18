//! CLI verb definitions and dispatch.

pub mod attach;
pub mod detach;
pub mod init;
pub mod mount;
pub mod unmount;

use clap::{Parser, Subcommand};
use ploopflex_common::types::Response;
use ploopflex_core::plugin::FlexVolume;

/// Mount ploop volumes in kubernetes using the flexvolume driver.
#[derive(Parser, Debug)]
#[command(name = ploopflex_common::constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Verb issued by the kubelet.
    #[command(subcommand)]
    pub command: Command,
}

/// Flexvolume verbs.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report driver availability.
    Init(init::InitArgs),
    /// Create the ploop volume if it does not exist.
    Attach(attach::AttachArgs),
    /// Release the ploop device.
    Detach(detach::DetachArgs),
    /// Mount the volume into a pod directory.
    Mount(mount::MountArgs),
    /// Unmount the volume from a pod directory.
    Unmount(unmount::UnmountArgs),
    /// Any verb this driver does not implement.
    #[command(external_subcommand)]
    Unsupported(Vec<String>),
}

impl Command {
    /// Whether the verb needs the disk-image backend, and therefore a
    /// valid configuration.
    pub const fn uses_backend(&self) -> bool {
        matches!(self, Self::Attach(_) | Self::Detach(_) | Self::Mount(_))
    }
}

/// Dispatches the parsed verb to `driver`.
pub fn execute(cli: Cli, driver: &dyn FlexVolume) -> Response {
    match cli.command {
        Command::Init(args) => init::execute(&args, driver),
        Command::Attach(args) => attach::execute(&args, driver),
        Command::Detach(args) => detach::execute(&args, driver),
        Command::Mount(args) => mount::execute(&args, driver),
        Command::Unmount(args) => unmount::execute(&args, driver),
        Command::Unsupported(argv) => {
            let verb = argv.first().map_or("", String::as_str);
            tracing::debug!(verb, "verb not supported");
            Response::not_supported(format!("{verb} is not supported by the ploop driver"))
        }
    }
}
