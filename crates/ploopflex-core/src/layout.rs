//! Deterministic on-disk layout of a volume.
//!
//! A volume `id` under the root `path` lives in `path/id/`, which holds the
//! ploop descriptor and an image file also named `id`.

use std::path::PathBuf;

use ploopflex_common::constants::DESCRIPTOR_FILE;
use ploopflex_common::error::{PloopError, Result};
use ploopflex_common::types::{OPT_VOLUME_ID, OPT_VOLUME_PATH, Options, VolumeId, option};

/// Paths belonging to a single volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeLayout {
    root: PathBuf,
    id: VolumeId,
}

impl VolumeLayout {
    /// Creates the layout for `id` below `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, id: VolumeId) -> Self {
        Self {
            root: root.into(),
            id,
        }
    }

    /// Builds the layout from the `volumePath` and `volumeId` options.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first missing option.
    pub fn from_options(options: &Options) -> Result<Self> {
        let root = option(options, OPT_VOLUME_PATH);
        if root.is_empty() {
            return Err(PloopError::validation("Must specify a volume path"));
        }
        let id = option(options, OPT_VOLUME_ID);
        if id.is_empty() {
            return Err(PloopError::validation("Must specify a volume id"));
        }
        Ok(Self::new(root, VolumeId::new(id)))
    }

    /// Returns the volume identifier.
    #[must_use]
    pub const fn id(&self) -> &VolumeId {
        &self.id
    }

    /// Directory holding the descriptor and the image.
    #[must_use]
    pub fn dir(&self) -> PathBuf {
        self.root.join(self.id.as_str())
    }

    /// Path of `DiskDescriptor.xml`.
    #[must_use]
    pub fn descriptor(&self) -> PathBuf {
        self.dir().join(DESCRIPTOR_FILE)
    }

    /// Path of the image file.
    #[must_use]
    pub fn image(&self) -> PathBuf {
        self.dir().join(self.id.as_str())
    }

    /// Whether the volume has been created, judged solely by its descriptor.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.descriptor().is_file()
    }
}
