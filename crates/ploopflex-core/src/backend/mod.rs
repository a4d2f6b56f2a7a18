//! Disk-image backend abstraction.
//!
//! The driver never touches image internals. It asks a [`DiskBackend`] to
//! create images, open them by descriptor, and release devices, and it
//! queries an opened [`DiskVolume`] for its mount state.

pub mod cli;

use std::path::{Path, PathBuf};

use ploopflex_common::error::Result;

/// Parameters for creating a new image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateParams {
    /// Image size in kilobytes.
    pub size_kb: u64,
    /// Image file; the descriptor is written next to it.
    pub file: PathBuf,
}

/// Parameters for mounting an opened image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountParams {
    /// Directory the image filesystem is mounted on.
    pub target: PathBuf,
    /// Mount read-only.
    pub readonly: bool,
}

/// An opened image.
///
/// The handle is released when dropped, on every exit path of its owner.
pub trait DiskVolume {
    /// Descriptor the handle was opened from.
    fn descriptor(&self) -> &Path;

    /// Returns the block device if the image is mounted.
    ///
    /// # Errors
    ///
    /// Returns an error if the mount state cannot be queried.
    fn mounted_device(&self) -> Result<Option<String>>;

    /// Mounts the image and returns the block device backing it, or `None`
    /// when the mount succeeded but the backend did not name a device.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses to mount the image.
    fn mount(&self, params: &MountParams) -> Result<Option<String>>;
}

/// Creates, opens, and releases disk images.
pub trait DiskBackend {
    /// Creates a new image.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be created.
    fn create(&self, params: &CreateParams) -> Result<()>;

    /// Opens the image described by `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptor is missing or unreadable.
    fn open(&self, descriptor: &Path) -> Result<Box<dyn DiskVolume + '_>>;

    /// Unmounts whatever image is attached to `device`.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be released.
    fn umount_by_device(&self, device: &str) -> Result<()>;

    /// Returns whether the backend can run on this host.
    fn is_available(&self) -> bool;
}
