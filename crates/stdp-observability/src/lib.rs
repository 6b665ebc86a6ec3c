// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # stdp-observability
//!
//! Logging initialization for the STDP crates with per-crate debug flag
//! support.
//!
//! ## Features
//! - `file-logging`: Rolling JSON log files in timestamped run folders

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Known crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "stdp-engine",
    "stdp-core",
    "stdp-config",
    "stdp-observability",
];
