//! Unified error types for the ploop flexvolume workspace.
//!
//! Every verb of the driver turns these into a `Failure` response, so the
//! `Display` text of each variant is what the kubelet ends up logging.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum PloopError {
    /// A required option was missing or empty.
    #[error("{message}")]
    Validation {
        /// Caller-facing description naming the missing field.
        message: String,
    },

    /// A human-readable size string could not be parsed.
    #[error("invalid volume size {value:?}: {reason}")]
    InvalidSize {
        /// The rejected input.
        value: String,
        /// Why parsing failed.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The `ploop` tool exited unsuccessfully.
    #[error("{command} failed (exit code {code}): {stderr}")]
    Backend {
        /// Command line that was run.
        command: String,
        /// Exit code, or `-1` when killed by a signal.
        code: i32,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// A mount or unmount syscall failed.
    #[error("mount operation on {path} failed: {message}")]
    Mount {
        /// Mount point involved.
        path: PathBuf,
        /// Errno description.
        message: String,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Coarse classification of a [`PloopError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller supplied bad or missing input.
    ValidationFailure,
    /// A filesystem, syscall, or backend operation failed.
    OperationFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailure => write!(f, "ValidationFailure"),
            Self::OperationFailure => write!(f, "OperationFailure"),
        }
    }
}

impl PloopError {
    /// Builds a [`PloopError::Validation`] from a message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Returns the stable classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. }
            | Self::InvalidSize { .. }
            | Self::Config { .. }
            | Self::Serialization { .. } => ErrorKind::ValidationFailure,
            Self::Io { .. } | Self::Backend { .. } | Self::NotFound { .. } | Self::Mount { .. } => {
                ErrorKind::OperationFailure
            }
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, PloopError>;
