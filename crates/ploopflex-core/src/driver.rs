//! The ploop implementation of the flexvolume verbs.
//!
//! Each verb validates its input, derives the volume layout, calls the
//! backend or the host, and folds the outcome into a [`Response`].
//! Idempotency comes from the filesystem: a descriptor file means the
//! volume exists, and the backend's device listing means it is mounted.

use std::path::Path;

use ploopflex_common::config::DriverConfig;
use ploopflex_common::constants::{MOUNT_DIR_MODE, VOLUME_DIR_MODE};
use ploopflex_common::error::{PloopError, Result};
use ploopflex_common::size;
use ploopflex_common::types::{
    Capabilities, OPT_READWRITE, OPT_SIZE, Options, Response, option,
};

use crate::backend::cli::PloopCli;
use crate::backend::{CreateParams, DiskBackend, MountParams};
use crate::filesystem::dirs;
use crate::filesystem::mount::{HostMounter, Mounter};
use crate::layout::VolumeLayout;
use crate::plugin::FlexVolume;
use crate::state::VolumeState;

/// Message prefix for a failed detach.
pub const DETACH_FAILED: &str = "Unable to detach ploop volume";
/// Message prefix for a failed unmount.
pub const UNMOUNT_FAILED: &str = "Unable to unmount ploop volume from pod";
/// Message prefix for a mount point that could not be removed.
pub const REMOVE_FAILED: &str = "Unable to remove stale directory from pod";

/// Flexvolume driver for ploop images.
pub struct PloopDriver {
    backend: Box<dyn DiskBackend>,
    mounter: Box<dyn Mounter>,
}

impl std::fmt::Debug for PloopDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PloopDriver").finish_non_exhaustive()
    }
}

impl PloopDriver {
    /// Creates a driver over the given backend and mounter.
    #[must_use]
    pub fn new(backend: Box<dyn DiskBackend>, mounter: Box<dyn Mounter>) -> Self {
        Self { backend, mounter }
    }

    /// Creates a driver that shells out to `ploop` and unmounts through the
    /// host kernel.
    #[must_use]
    pub fn from_config(config: &DriverConfig) -> Self {
        Self::new(Box::new(PloopCli::new(config)), Box::new(HostMounter))
    }

    fn try_attach(&self, options: &Options) -> Result<Response> {
        let layout = VolumeLayout::from_options(options)?;
        let image = layout.image().display().to_string();

        if layout.exists() {
            tracing::info!(volume = %layout.id(), "volume already exists");
            return Ok(Response::success("Volume already exists").with_device(image));
        }

        let requested = option(options, OPT_SIZE);
        if requested.trim().is_empty() {
            return Err(PloopError::validation("Must specify a volume size"));
        }
        let size_kb = size::to_kilobytes(size::parse_bytes(requested)?);

        dirs::create_dir_all(&layout.dir(), VOLUME_DIR_MODE)?;
        self.backend.create(&CreateParams {
            size_kb,
            file: layout.image(),
        })?;

        tracing::info!(volume = %layout.id(), size_kb, "volume attached");
        Ok(Response::success("Successfully attached the ploop volume").with_device(image))
    }
}

/// Logs `err` and turns it into a failure response.
fn failure(verb: &str, err: &PloopError) -> Response {
    tracing::warn!(verb, kind = %err.kind(), error = %err, "verb failed");
    Response::failure(err.to_string())
}

/// Like [`failure`], with a fixed message prefix ahead of the error text.
fn prefixed_failure(verb: &str, prefix: &str, err: &PloopError) -> Response {
    tracing::warn!(verb, kind = %err.kind(), error = %err, "verb failed");
    Response::failure(format!("{prefix}: {err}"))
}

impl FlexVolume for PloopDriver {
    fn init(&self) -> Response {
        tracing::debug!(available = self.backend.is_available(), "init");
        Response::success("Ploop is available").with_capabilities(Capabilities { attach: true })
    }

    fn attach(&self, options: &Options) -> Response {
        self.try_attach(options)
            .unwrap_or_else(|err| failure("attach", &err))
    }

    fn detach(&self, device: &str) -> Response {
        if device.is_empty() {
            return failure("detach", &PloopError::validation("Must specify a device"));
        }
        match self.backend.umount_by_device(device) {
            Ok(()) => Response::success("Successfully detached the ploop volume").with_device(device),
            Err(err) => prefixed_failure("detach", DETACH_FAILED, &err).with_device(device),
        }
    }

    fn mount(&self, target: &Path, device: &str, options: &Options) -> Response {
        let layout = match VolumeLayout::from_options(options) {
            Ok(layout) => layout,
            Err(err) => return failure("mount", &err).with_device(device),
        };

        if let Err(err) = dirs::create_dir_all(target, MOUNT_DIR_MODE) {
            return failure("mount", &err).with_device(device);
        }

        if !layout.exists() {
            tracing::warn!(volume = %layout.id(), state = %VolumeState::Absent, "mount before attach");
            let message = format!(
                "ploop volume {} does not exist at {}",
                layout.id(),
                layout.dir().display()
            );
            return Response::failure(message).with_device(device);
        }

        let volume = match self.backend.open(&layout.descriptor()) {
            Ok(volume) => volume,
            Err(err) => return failure("mount", &err).with_device(device),
        };

        match VolumeState::of(volume.as_ref()) {
            Ok(VolumeState::Mounted { device: mounted }) => {
                tracing::info!(volume = %layout.id(), device = %mounted, "already mounted");
                Response::success("Ploop volume already mounted").with_device(mounted)
            }
            Ok(state) => {
                let params = MountParams {
                    target: target.to_path_buf(),
                    readonly: option(options, OPT_READWRITE) == "ro",
                };
                match volume.mount(&params) {
                    Ok(mounted) => {
                        let mounted = mounted.unwrap_or_else(|| device.to_string());
                        tracing::info!(volume = %layout.id(), from = %state, device = %mounted, "volume mounted");
                        Response::success("Successfully mounted the ploop volume")
                            .with_device(mounted)
                    }
                    Err(err) => {
                        let reported = volume
                            .mounted_device()
                            .ok()
                            .flatten()
                            .unwrap_or_else(|| device.to_string());
                        failure("mount", &err).with_device(reported)
                    }
                }
            }
            Err(err) => failure("mount", &err).with_device(device),
        }
    }

    fn unmount(&self, mount: &Path) -> Response {
        let path = mount.display().to_string();

        if let Err(err) = self.mounter.unmount(mount) {
            return prefixed_failure("unmount", UNMOUNT_FAILED, &err).with_device(path);
        }
        if let Err(err) = dirs::remove_dir(mount) {
            return prefixed_failure("unmount", REMOVE_FAILED, &err).with_device(path);
        }

        tracing::info!(path = %path, "volume unmounted");
        Response::success("Successfully unmounted the ploop volume").with_device(path)
    }
}
