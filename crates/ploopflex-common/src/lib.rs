//! # ploopflex-common
//!
//! Shared types, error definitions, configuration, and constants used
//! across the ploop flexvolume workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and provides the response envelope, option keys, and the
//! size parser that the adapter and the driver binary build upon.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod size;
pub mod types;
