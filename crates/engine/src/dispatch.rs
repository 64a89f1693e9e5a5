// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-step dispatch: resolve → ensure driver started → execute → time it.
//! Wraps the real work in timing and tracing, turning the outcome into a
//! result record rather than letting callers see the raw error type.

use std::collections::HashMap;

use chrono::Utc;
use drover_core::DriverId;
use drover_registry::Registry;
use drover_steps::StepRegistry;
use drover_supervisor::Supervisor;
use drover_wire::{StepOutcome, StepResult};

use crate::clients::ClientCache;

/// Execute one step's text against the running fleet, producing a
/// fully-formed [`StepResult`] regardless of outcome — failures are data,
/// not propagated errors, so a scenario can record them and move on.
pub async fn dispatch_step(
    text: &str,
    steps: &StepRegistry,
    registry: &Registry,
    supervisor: &Supervisor,
    clients: &ClientCache,
    driver_configs: &HashMap<DriverId, serde_json::Value>,
) -> StepResult {
    let start = std::time::Instant::now();
    let timestamp = Utc::now();

    let outcome = dispatch_inner(text, steps, registry, supervisor, clients, driver_configs).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(data) => {
            tracing::info!(step = %text, duration_ms, "step passed");
            StepResult { step: text.to_string(), success: true, data: Some(data), error: None, timestamp, duration_ms }
        }
        Err(message) => {
            tracing::error!(step = %text, duration_ms, error = %message, "step failed");
            StepResult {
                step: text.to_string(),
                success: false,
                data: None,
                error: Some(StepOutcome { message }),
                timestamp,
                duration_ms,
            }
        }
    }
}

async fn dispatch_inner(
    text: &str,
    steps: &StepRegistry,
    registry: &Registry,
    supervisor: &Supervisor,
    clients: &ClientCache,
    driver_configs: &HashMap<DriverId, serde_json::Value>,
) -> Result<serde_json::Value, String> {
    let matched = steps.resolve(text).map_err(|e| e.to_string())?;

    let meta = registry
        .get(&matched.driver_id)
        .await
        .ok_or_else(|| format!("driver {} not found in catalog", matched.driver_id))?;

    let config = driver_configs.get(&matched.driver_id).cloned().unwrap_or(serde_json::Value::Null);
    let client = clients.get_or_start(&meta, supervisor, config, steps).await.map_err(|e| e.to_string())?;

    let args = serde_json::Value::Array(matched.args.into_iter().map(serde_json::Value::String).collect());
    client.execute(&matched.action, args).await.map_err(|e| e.to_string())
}
