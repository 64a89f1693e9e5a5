// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered host configuration.
//!
//! Priority, lowest to highest: built-in defaults < `drover.toml` in the
//! working directory < environment variables < CLI flags. Each layer is
//! merged with [`HostConfig::merge`] so the CLI can apply flags last.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use crate::DriverId;

/// `LOG_LEVEL` values accepted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

crate::simple_display! {
    LogLevel {
        Debug => "debug",
        Info => "info",
        Warn => "warn",
        Error => "error",
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// Merged runtime configuration for a single `drover run` invocation.
///
/// Built once at CLI startup (see `drover-cli`) and passed by reference into
/// the Execution Engine's `Initialize`.
#[derive(Debug, Clone, Default)]
pub struct HostConfig {
    /// Extra driver search path, appended after the built-in defaults (`DRIVER_DIR`).
    pub driver_dir: Option<PathBuf>,
    pub log_level: LogLevel,
    /// Override for where the JSON/HTML/text reports are written (`REPORT_PATH`).
    pub report_path: Option<PathBuf>,
    /// Pre-start a specific driver instead of lazily starting per step.
    pub driver: Option<DriverId>,
    /// Per-driver `initialize` configuration, merged with the manifest's own `config`.
    pub driver_config: serde_json::Value,
    /// Tag expression used to filter scenarios (`@smoke`, `@smoke,@slow`, ...).
    pub tags: Vec<String>,
    pub parallel: bool,
    pub parallel_workers: usize,
}

impl HostConfig {
    pub fn from_file(contents: &str) -> Result<Self, toml::de::Error> {
        #[derive(serde::Deserialize, Default)]
        struct RawFile {
            driver_dir: Option<PathBuf>,
            log_level: Option<String>,
            report_path: Option<PathBuf>,
            parallel: Option<bool>,
            parallel_workers: Option<usize>,
        }
        let raw: RawFile = toml::from_str(contents)?;
        Ok(Self {
            driver_dir: raw.driver_dir,
            log_level: raw
                .log_level
                .and_then(|s| LogLevel::from_str(&s).ok())
                .unwrap_or_default(),
            report_path: raw.report_path,
            driver: None,
            driver_config: serde_json::Value::Null,
            tags: Vec::new(),
            parallel: raw.parallel.unwrap_or(false),
            parallel_workers: raw.parallel_workers.unwrap_or(4),
        })
    }

    /// Apply environment variables on top of `self`, matching §6's host env vars.
    pub fn apply_env(&mut self, env: &HashMap<String, String>) {
        if let Some(dir) = env.get("DRIVER_DIR") {
            self.driver_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = env.get("LOG_LEVEL").and_then(|s| LogLevel::from_str(s).ok()) {
            self.log_level = level;
        }
        if let Some(path) = env.get("REPORT_PATH") {
            self.report_path = Some(PathBuf::from(path));
        }
    }

    /// Merge a higher-priority layer (e.g. CLI flags) over `self`, returning the result.
    ///
    /// `Some` fields in `other` win; collections are replaced wholesale, not unioned.
    pub fn merge(self, other: HostConfigOverrides) -> Self {
        Self {
            driver_dir: other.driver_dir.or(self.driver_dir),
            log_level: other.log_level.unwrap_or(self.log_level),
            report_path: other.report_path.or(self.report_path),
            driver: other.driver.or(self.driver),
            driver_config: other.driver_config.unwrap_or(self.driver_config),
            tags: other.tags.unwrap_or(self.tags),
            parallel: other.parallel.unwrap_or(self.parallel),
            parallel_workers: other.parallel_workers.unwrap_or(self.parallel_workers),
        }
    }
}

/// CLI-flag overrides layered on top of file + env config.
#[derive(Debug, Clone, Default)]
pub struct HostConfigOverrides {
    pub driver_dir: Option<PathBuf>,
    pub log_level: Option<LogLevel>,
    pub report_path: Option<PathBuf>,
    pub driver: Option<DriverId>,
    pub driver_config: Option<serde_json::Value>,
    pub tags: Option<Vec<String>>,
    pub parallel: Option<bool>,
    pub parallel_workers: Option<usize>,
}
