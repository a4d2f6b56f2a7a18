//! # ploopflex-core
//!
//! The volume lifecycle adapter behind the ploop flexvolume driver.
//!
//! This crate provides:
//! - **Plugin**: the [`plugin::FlexVolume`] verb set the kubelet drives.
//! - **Driver**: [`driver::PloopDriver`], which validates options, derives
//!   volume paths, and turns every outcome into a response.
//! - **Backend**: the disk-image seam and its `ploop` tool implementation.
//! - **Filesystem**: mount point directories and forced unmounts.
//!
//! The adapter is stateless. Every verb runs in its own short-lived
//! process and relies on the filesystem and the ploop tool for
//! idempotency.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod backend;
pub mod driver;
pub mod filesystem;
pub mod layout;
pub mod plugin;
pub mod state;
