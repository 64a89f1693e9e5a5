// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `driver.json` manifest schema.

use serde::{Deserialize, Serialize};

use crate::StepDefinition;

/// Transport a driver speaks, declared in its manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Websocket,
    Http,
}

/// Parsed `driver.json`. Missing optional fields fall back to safe defaults
/// (`id` to the directory basename, `version` to `0.0.0`, `transport` to websocket)
/// at the call site in `drover-registry`, not here — this type mirrors the file
/// verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverManifest {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub executable: String,
    #[serde(default)]
    pub transport: Transport,
    #[serde(default)]
    pub supported_actions: Vec<String>,
    #[serde(default)]
    pub supported_steps: Vec<StepDefinition>,
    #[serde(default)]
    pub config: serde_json::Value,
}
