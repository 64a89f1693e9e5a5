// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Execution Engine (C5): wires the Registry, Step Registry, Supervisor
//! and RPC clients together to run a feature file end to end.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use drover_core::{DriverId, HostConfig};
use drover_registry::{search_paths, Registry};
use drover_steps::StepRegistry;
use drover_supervisor::Supervisor;
use drover_wire::{Report, StepResult};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::clients::ClientCache;
use crate::dispatch::dispatch_step;
use crate::feature::{self, Scenario};

pub struct Engine {
    config: HostConfig,
    registry: Registry,
    steps: StepRegistry,
    supervisor: Supervisor,
    clients: ClientCache,
    shutdown: CancellationToken,
}

impl Engine {
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            registry: Registry::new(),
            steps: StepRegistry::new(),
            supervisor: Supervisor::new(),
            clients: ClientCache::new(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Bring up the Registry, populate the Step Registry from every
    /// discovered driver's static `supportedSteps`, and optionally
    /// pre-start a specific driver named in config.
    pub async fn initialize(&mut self) -> Result<(), drover_core::ConfigurationError> {
        let paths = search_paths(None, self.config.driver_dir.as_deref());
        self.registry.initialize(&paths).await?;

        for id in self.registry.list().await {
            if let Some(meta) = self.registry.get(&id).await {
                if !meta.supported_steps.is_empty() {
                    self.steps.register_driver(meta.id, meta.supported_steps.clone());
                }
            }
        }

        if let Some(driver_id) = self.config.driver {
            if let Some(meta) = self.registry.get(&driver_id).await {
                let config = self.config.driver_config.clone();
                let _ = self.clients.get_or_start(&meta, &self.supervisor, config, &self.steps).await;
            }
        }

        Ok(())
    }

    /// Parse and run a feature file, honoring `config.tags` and
    /// `config.parallel`. Returns the flattened step results in scenario
    /// execution order (sequential mode) or completion order (parallel mode).
    pub async fn run_feature(&self, path: &std::path::Path) -> std::io::Result<Vec<StepResult>> {
        let contents = std::fs::read_to_string(path)?;
        let ast = feature::parse(&contents);
        let tags: Vec<String> = self.config.tags.clone();
        let scenarios: Vec<Scenario> =
            ast.scenarios.into_iter().filter(|s| feature::matches_tags(s, &tags)).collect();

        let driver_configs = self.driver_configs();

        if self.config.parallel {
            Ok(self.run_parallel(scenarios, &driver_configs).await)
        } else {
            Ok(self.run_sequential(scenarios, &driver_configs).await)
        }
    }

    fn driver_configs(&self) -> HashMap<DriverId, serde_json::Value> {
        let mut map = HashMap::new();
        if let Some(driver_id) = self.config.driver {
            map.insert(driver_id, self.config.driver_config.clone());
        }
        map
    }

    async fn run_sequential(
        &self,
        scenarios: Vec<Scenario>,
        driver_configs: &HashMap<DriverId, serde_json::Value>,
    ) -> Vec<StepResult> {
        let mut results = Vec::new();
        for scenario in scenarios {
            if self.shutdown.is_cancelled() {
                break;
            }
            results.extend(self.run_scenario(&scenario, driver_configs).await);
        }
        results
    }

    async fn run_parallel(
        &self,
        scenarios: Vec<Scenario>,
        driver_configs: &HashMap<DriverId, serde_json::Value>,
    ) -> Vec<StepResult> {
        let permits = Arc::new(Semaphore::new(self.config.parallel_workers.max(1)));
        let mut handles = Vec::new();
        for scenario in scenarios {
            let permits = permits.clone();
            let shutdown = self.shutdown.clone();
            let fut = async move {
                let _permit = permits.acquire().await.expect("semaphore is never closed");
                if shutdown.is_cancelled() {
                    return Vec::new();
                }
                self.run_scenario(&scenario, driver_configs).await
            };
            handles.push(fut);
        }
        futures_util_join_all(handles).await.into_iter().flatten().collect()
    }

    /// Run one scenario's steps in order; a failing step halts the scenario
    /// (subsequent steps are never dispatched) but never the feature.
    async fn run_scenario(
        &self,
        scenario: &Scenario,
        driver_configs: &HashMap<DriverId, serde_json::Value>,
    ) -> Vec<StepResult> {
        let mut results = Vec::new();
        for step in &scenario.steps {
            if self.shutdown.is_cancelled() {
                break;
            }
            let result = dispatch_step(
                &step.text,
                &self.steps,
                &self.registry,
                &self.supervisor,
                &self.clients,
                driver_configs,
            )
            .await;
            let failed = !result.success;
            results.push(result);
            if failed {
                break;
            }
        }
        results
    }

    /// Stop every driver and assemble the final report. Does not write it —
    /// callers decide where (see [`crate::report`]).
    pub async fn shutdown(&self, duration_ms: u64, results: Vec<StepResult>) -> Report {
        self.supervisor.stop_all().await;
        Report::from_results(Utc::now(), duration_ms, results)
    }

    pub async fn emergency_cleanup(&self) {
        self.supervisor.emergency_cleanup().await;
    }
}

/// Thin wrapper so the futures used above (which borrow `self`) don't need
/// `futures_util` imported at every call site.
async fn futures_util_join_all<F: std::future::Future>(futures: Vec<F>) -> Vec<F::Output> {
    futures_util::future::join_all(futures).await
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
