// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layers `drover.toml` < environment < CLI flags into one [`HostConfig`]
//! rather than a single monolithic settings object.

use std::collections::HashMap;

use drover_core::{ConfigurationError, DriverId, ExitError, HostConfig, HostConfigOverrides};

use crate::cli::Command;

pub fn load(command: &Command) -> Result<HostConfig, ExitError> {
    let file_config = match std::fs::read_to_string("drover.toml") {
        Ok(contents) => HostConfig::from_file(&contents).map_err(|e| {
            ExitError::from(ConfigurationError::InvalidArgument(format!("drover.toml: {e}")))
        })?,
        Err(_) => HostConfig::default(),
    };

    let mut config = file_config;
    let env: HashMap<String, String> = std::env::vars().collect();
    config.apply_env(&env);

    let overrides = cli_overrides(command)?;
    Ok(config.merge(overrides))
}

fn cli_overrides(command: &Command) -> Result<HostConfigOverrides, ExitError> {
    let Command::Run { driver, driver_config, tags, parallel, report, .. } = command else {
        return Ok(HostConfigOverrides::default());
    };

    let driver_config = match driver_config {
        Some(raw) => Some(
            serde_json::from_str(raw)
                .map_err(|e| ExitError::usage(format!("--driverConfig is not valid JSON: {e}")))?,
        ),
        None => None,
    };

    let driver = match driver.as_deref() {
        Some(raw) => {
            Some(DriverId::from_string(raw).map_err(|e| ExitError::usage(format!("--driver: {e}")))?)
        }
        None => None,
    };

    Ok(HostConfigOverrides {
        driver,
        driver_config,
        tags: tags.as_ref().map(|t| t.split(',').map(|s| s.trim().to_string()).collect()),
        parallel: *parallel,
        report_path: report.clone(),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_drivers_has_no_cli_overrides() {
        let overrides = cli_overrides(&Command::ListDrivers).unwrap();
        assert!(overrides.driver.is_none());
        assert!(overrides.tags.is_none());
    }

    #[test]
    fn run_parses_tags_into_a_list() {
        let command = Command::Run {
            feature: "f.feature".into(),
            driver: None,
            driver_config: None,
            tags: Some("smoke, fast".to_string()),
            parallel: None,
            report: None,
        };
        let overrides = cli_overrides(&command).unwrap();
        assert_eq!(overrides.tags, Some(vec!["smoke".to_string(), "fast".to_string()]));
    }

    #[test]
    fn run_rejects_malformed_driver_config_json() {
        let command = Command::Run {
            feature: "f.feature".into(),
            driver: None,
            driver_config: Some("{not json".to_string()),
            tags: None,
            parallel: None,
            report: None,
        };
        let err = cli_overrides(&command).unwrap_err();
        assert_eq!(err.code, 2);
    }
}
