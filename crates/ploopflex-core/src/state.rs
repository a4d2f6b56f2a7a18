//! Lifecycle state of a volume, derived on demand.
//!
//! Nothing is persisted: the state is read from the descriptor file and the
//! backend each time a verb needs it.

use std::fmt;

use ploopflex_common::error::Result;

use crate::backend::DiskVolume;

/// Where a volume stands in `Absent -> Created -> Mounted`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VolumeState {
    /// No descriptor on disk.
    Absent,
    /// The image exists but is not mounted.
    Created,
    /// The image is mounted through `device`.
    Mounted {
        /// Block device backing the mount.
        device: String,
    },
}

impl VolumeState {
    /// Reads the state of an opened volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot report the mount state.
    pub fn of(volume: &dyn DiskVolume) -> Result<Self> {
        Ok(volume
            .mounted_device()?
            .map_or(Self::Created, |device| Self::Mounted { device }))
    }
}

impl fmt::Display for VolumeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Created => write!(f, "created"),
            Self::Mounted { device } => write!(f, "mounted on {device}"),
        }
    }
}
