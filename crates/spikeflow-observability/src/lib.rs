// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # spikeflow-observability
//!
//! Unified logging infrastructure for spikeflow.
//!
//! Provides consistent logging patterns across all spikeflow crates with
//! per-crate debug flag support.
//!
//! ## Features
//! - `file-logging`: File-based log rotation with one folder per run (desktop only)

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Known spikeflow crate names for debug flags
///
/// These double as `tracing` targets: every crate logs with `target: "<crate-name>"`.
pub const KNOWN_CRATES: &[&str] = &[
    "spikeflow-config",
    "spikeflow-neural",
    "spikeflow-engine",
    "spikeflow-plasticity",
];
