//! Host filesystem operations around pod mount points.
//!
//! Provides mode-aware directory creation and removal, and the forced
//! unmount used when a pod releases its volume.

pub mod dirs;
pub mod mount;
