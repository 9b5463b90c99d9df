// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization for spikeflow
//!
//! Console logging is always available. With the `file-logging` feature, runs
//! can also write JSON logs into a timestamped folder with retention cleanup.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::cli::CrateDebugFlags;

#[cfg(feature = "file-logging")]
pub use file::{init_logging, init_logging_default, LoggingGuard};

/// Initialize console logging
///
/// `base_level` applies to every target not raised by `debug_flags`. Calling
/// this more than once is harmless: later calls leave the first subscriber in place.
pub fn init_console_logging(debug_flags: &CrateDebugFlags, base_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(debug_flags.to_filter_string_with_base(base_level))?;

    // Already initialised (tests, embedding applications)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();

    Ok(())
}

#[cfg(feature = "file-logging")]
mod file {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use chrono::{DateTime, NaiveDateTime, Utc};
    use tracing_appender::rolling;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, Layer, Registry};

    use crate::cli::CrateDebugFlags;
    use crate::config::{LogOutput, LoggingConfig};

    const RUN_PREFIX: &str = "run_";
    const RUN_FORMAT: &str = "%Y%m%d_%H%M%S";

    /// Keeps the non-blocking writers alive; logs are flushed when dropped
    pub struct LoggingGuard {
        _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
        log_dir: PathBuf,
    }

    impl LoggingGuard {
        /// Get the run's log directory path
        pub fn log_dir(&self) -> &Path {
            &self.log_dir
        }
    }

    /// Initialize logging with file output and console output
    ///
    /// Creates a timestamped folder structure:
    /// ```text
    /// ./logs/
    ///   └── run_20250101_120000/
    ///       ├── spikeflow-engine.log
    ///       ├── spikeflow-neural.log
    ///       └── spikeflow.log (combined)
    /// ```
    pub fn init_logging(
        debug_flags: &CrateDebugFlags,
        config: &LoggingConfig,
    ) -> Result<LoggingGuard> {
        let base_log_dir = match &config.output {
            LogOutput::Directory(dir) => dir.clone(),
            LogOutput::Stdout => PathBuf::from("./logs"),
        };

        let timestamp = Utc::now().format(RUN_FORMAT);
        let run_folder = base_log_dir.join(format!("{}{}", RUN_PREFIX, timestamp));
        std::fs::create_dir_all(&run_folder)
            .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

        cleanup_old_logs(&base_log_dir, config.retention_days, config.retention_runs)?;

        let filter = debug_flags.to_filter_string_with_base(&config.level);
        let env_filter = EnvFilter::try_new(&filter)?;

        let mut layers = Vec::new();
        let mut file_guards = Vec::new();

        let console_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_filter(env_filter)
            .boxed();
        layers.push(console_layer);

        for crate_name in crate::KNOWN_CRATES {
            let file_appender = rolling::daily(&run_folder, format!("{}.log", crate_name));
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            file_guards.push(guard);

            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(EnvFilter::try_new(format!("{}=debug,off", crate_name))?)
                .boxed();
            layers.push(file_layer);
        }

        let combined_appender = rolling::daily(&run_folder, "spikeflow.log");
        let (combined_non_blocking, combined_guard) =
            tracing_appender::non_blocking(combined_appender);
        file_guards.push(combined_guard);

        let combined_layer = tracing_subscriber::fmt::layer()
            .with_writer(combined_non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(EnvFilter::try_new(&filter)?)
            .boxed();
        layers.push(combined_layer);

        Registry::default()
            .with(layers)
            .try_init()
            .context("A global tracing subscriber is already installed")?;

        Ok(LoggingGuard {
            _file_guards: file_guards,
            log_dir: run_folder,
        })
    }

    /// Initialize file logging under `./logs` with default retention
    pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
        init_logging(
            debug_flags,
            &LoggingConfig::directory("info", PathBuf::from("./logs")),
        )
    }

    /// Remove run folders older than `retention_days`, then keep only the newest `retention_runs`
    pub(crate) fn cleanup_old_logs(
        base_log_dir: &Path,
        retention_days: u64,
        retention_runs: usize,
    ) -> Result<()> {
        if !base_log_dir.exists() {
            return Ok(());
        }

        let cutoff_date = Utc::now() - chrono::Duration::days(retention_days as i64);

        let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
        for entry in std::fs::read_dir(base_log_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let started = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix(RUN_PREFIX))
                .and_then(|ts| NaiveDateTime::parse_from_str(ts, RUN_FORMAT).ok());
            if let Some(started) = started {
                runs.push((path, started.and_utc()));
            }
        }

        // Oldest first
        runs.sort_by_key(|(_, dt)| *dt);

        let (expired, kept): (Vec<_>, Vec<_>) =
            runs.into_iter().partition(|(_, dt)| *dt < cutoff_date);

        let excess = kept.len().saturating_sub(retention_runs);
        for (path, _) in expired.iter().chain(kept.iter().take(excess)) {
            if let Err(e) = std::fs::remove_dir_all(path) {
                tracing::warn!(
                    "Failed to remove old log directory {}: {}",
                    path.display(),
                    e
                );
            }
        }

        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_logging_is_idempotent() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-spikeflow-engine".to_string()]);
        assert!(init_console_logging(&flags, "warn").is_ok());
        assert!(init_console_logging(&flags, "warn").is_ok());
    }
}
