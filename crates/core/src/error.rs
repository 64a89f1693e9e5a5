// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code, plus the error
//! taxonomy shared across the host's components.
//!
//! Fallible operations return `ExitError` instead of calling
//! `std::process::exit()` directly, letting `main()` own process
//! termination. Exit codes follow the host's CLI surface: 0 all passed,
//! 1 any step failed, 2 usage error, 3 initialization failure.

use std::fmt;

use thiserror::Error;

pub const EXIT_STEP_FAILED: i32 = 1;
pub const EXIT_USAGE_ERROR: i32 = 2;
pub const EXIT_INIT_FAILURE: i32 = 3;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE_ERROR, message)
    }

    pub fn init_failure(message: impl Into<String>) -> Self {
        Self::new(EXIT_INIT_FAILURE, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<ConfigurationError> for ExitError {
    fn from(err: ConfigurationError) -> Self {
        Self::init_failure(err.to_string())
    }
}

/// Bad manifest, bad CLI args, or driver discovery timeout. Aborts startup.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("driver search timed out after {0:?}")]
    DiscoveryTimeout(std::time::Duration),
    #[error("invalid driver manifest at {path}: {reason}")]
    InvalidManifest { path: std::path::PathBuf, reason: String },
    #[error("{0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Spawn, readiness, or initial `capabilities` call failure.
#[derive(Debug, Error)]
pub enum DriverStartupError {
    #[error("failed to spawn driver {driver_id} ({executable}): {cause}")]
    SpawnFailed { driver_id: String, executable: String, cause: String },
    #[error("driver {driver_id} did not become ready within {elapsed:?}")]
    ReadinessTimeout { driver_id: String, elapsed: std::time::Duration },
    #[error("driver {driver_id} exited before becoming ready (code {exit_code:?})")]
    ExitedBeforeReady { driver_id: String, exit_code: Option<i32> },
    #[error("no available port after {attempts} attempts")]
    PortExhausted { attempts: u32 },
}

/// Socket closed mid-request, parse error, or unknown message id.
#[derive(Debug, Error)]
pub enum DriverCommunicationError {
    #[error("connection to driver {driver_id} closed: {reason}")]
    ConnectionClosed { driver_id: String, reason: String },
    #[error("malformed message from driver {driver_id}: {reason}")]
    MalformedMessage { driver_id: String, reason: String },
    #[error("response for unknown request id {request_id} from driver {driver_id}")]
    UnknownRequestId { driver_id: String, request_id: String },
}

/// An RPC call's deadline expired before a response arrived.
#[derive(Debug, Error)]
#[error("request to driver {driver_id} timed out after {elapsed:?}")]
pub struct RequestTimeout {
    pub driver_id: String,
    pub elapsed: std::time::Duration,
}

/// Step text matched no registered pattern.
#[derive(Debug, Error)]
#[error("unmatched step: \"{step}\"{}", did_you_mean.as_ref().map(|s| format!(" (did you mean \"{s}\"?)")).unwrap_or_default())]
pub struct UnmatchedStep {
    pub step: String,
    pub did_you_mean: Option<String>,
}

/// A driver returned an `error` payload in its RPC response.
#[derive(Debug, Error)]
#[error("driver error (code {code}): {message}")]
pub struct DriverError {
    pub code: i32,
    pub message: String,
}
