//! The flexvolume verb set.
//!
//! The kubelet runs the driver binary once per verb and reads a single
//! JSON [`Response`] back. Implementors never fail outright: every error
//! becomes a `Failure` response.

use std::path::Path;

use ploopflex_common::types::{Options, Response};

/// Operations a flexvolume driver answers.
pub trait FlexVolume {
    /// Reports driver availability and capabilities.
    fn init(&self) -> Response;

    /// Ensures the volume described by `options` exists.
    fn attach(&self, options: &Options) -> Response;

    /// Releases the block device backing a volume.
    fn detach(&self, device: &str) -> Response;

    /// Mounts the volume described by `options` on `target`.
    fn mount(&self, target: &Path, device: &str, options: &Options) -> Response;

    /// Unmounts `mount` and removes the mount point.
    fn unmount(&self, mount: &Path) -> Response;
}
