//! Directory creation and removal for volume and mount point paths.

use std::path::Path;

use ploopflex_common::error::{PloopError, Result};

/// Creates `path` and any missing parents with the given permission bits.
///
/// Existing directories are left untouched.
///
/// # Errors
///
/// Returns an error if any component cannot be created.
#[cfg(unix)]
pub fn create_dir_all(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(mode)
        .create(path)
        .map_err(|e| PloopError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
    tracing::debug!(path = %path.display(), mode = %format!("{mode:o}"), "directory ready");
    Ok(())
}

/// Creates `path` and any missing parents; `mode` is ignored off Unix.
///
/// # Errors
///
/// Returns an error if any component cannot be created.
#[cfg(not(unix))]
pub fn create_dir_all(path: &Path, _mode: u32) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| PloopError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Removes the empty directory at `path`.
///
/// # Errors
///
/// Returns an error if the directory is missing, not empty, or cannot be
/// removed.
pub fn remove_dir(path: &Path) -> Result<()> {
    std::fs::remove_dir(path).map_err(|e| PloopError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), "directory removed");
    Ok(())
}
