//! Unmounting pod mount points.

use std::path::Path;

use ploopflex_common::error::{PloopError, Result};

/// Detaches filesystems from mount points.
pub trait Mounter {
    /// Unmounts the filesystem at `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the unmount fails.
    fn unmount(&self, target: &Path) -> Result<()>;
}

/// [`Mounter`] backed by the host's `umount2(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostMounter;

impl Mounter for HostMounter {
    /// Uses `MNT_DETACH` so a busy mount is lazily released.
    #[cfg(target_os = "linux")]
    fn unmount(&self, target: &Path) -> Result<()> {
        nix::mount::umount2(target, nix::mount::MntFlags::MNT_DETACH).map_err(|e| {
            PloopError::Mount {
                path: target.to_path_buf(),
                message: e.desc().to_string(),
            }
        })?;
        tracing::info!(path = %target.display(), "filesystem unmounted");
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    fn unmount(&self, target: &Path) -> Result<()> {
        Err(PloopError::Mount {
            path: target.to_path_buf(),
            message: "Linux required for ploop volumes".into(),
        })
    }
}
