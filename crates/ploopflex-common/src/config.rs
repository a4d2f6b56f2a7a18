//! Driver configuration model.
//!
//! The kubelet runs the driver with a bare environment and no flags beyond
//! the verb, so every tunable is read from `PLOOP_FLEX_*` variables.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{PloopError, Result};

/// Allocation mode for newly created ploop images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMode {
    /// Sparse image that grows on demand.
    #[default]
    Expanded,
    /// Fully allocated ploop image.
    Preallocated,
    /// Raw image without ploop metadata.
    Raw,
}

impl ImageMode {
    /// Returns the value passed to `ploop init -f`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expanded => "expanded",
            Self::Preallocated => "preallocated",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for ImageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageMode {
    type Err = PloopError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expanded" => Ok(Self::Expanded),
            "preallocated" => Ok(Self::Preallocated),
            "raw" => Ok(Self::Raw),
            other => Err(PloopError::Config {
                message: format!("unknown image mode {other:?}"),
            }),
        }
    }
}

/// Root configuration for the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Path or bare name of the `ploop` tool.
    pub ploop_binary: PathBuf,
    /// Filesystem created inside new images.
    pub fs_type: String,
    /// Allocation mode for new images.
    pub image_mode: ImageMode,
    /// Log destination; stderr when unset.
    pub log_file: Option<PathBuf>,
    /// Tracing filter directive.
    pub log_filter: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            ploop_binary: PathBuf::from(constants::DEFAULT_PLOOP_BINARY),
            fs_type: constants::DEFAULT_FS_TYPE.to_string(),
            image_mode: ImageMode::default(),
            log_file: None,
            log_filter: constants::DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl DriverConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, falling back
    /// to defaults for unset or empty keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the image mode is not recognised.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(binary) = get(constants::ENV_PLOOP_BINARY) {
            config.ploop_binary = PathBuf::from(binary);
        }
        if let Some(fs_type) = get(constants::ENV_FS_TYPE) {
            config.fs_type = fs_type;
        }
        if let Some(mode) = get(constants::ENV_IMAGE_MODE) {
            config.image_mode = mode.parse()?;
        }
        config.log_file = get(constants::ENV_LOG_FILE).map(PathBuf::from);
        if let Some(filter) = get(constants::ENV_LOG_FILTER) {
            config.log_filter = filter;
        }

        Ok(config)
    }
}
