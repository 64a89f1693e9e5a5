// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tracing-subscriber setup, driven by [`crate::LogLevel`] / `LOG_LEVEL`.

use tracing_subscriber::EnvFilter;

use crate::LogLevel;

/// Install a global `tracing` subscriber writing to stderr.
///
/// `LOG_LEVEL` (or an explicit `RUST_LOG`, which wins if set) controls verbosity;
/// falls back to `level` when neither is present. Safe to call once per process;
/// a second call is a no-op logged at debug.
pub fn init(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if subscriber.try_init().is_err() {
        tracing::debug!("tracing subscriber already initialized, skipping");
    }
}

fn default_directive(level: LogLevel) -> String {
    match level {
        LogLevel::Debug => "debug".to_string(),
        LogLevel::Info => "info".to_string(),
        LogLevel::Warn => "warn".to_string(),
        LogLevel::Error => "error".to_string(),
    }
}
