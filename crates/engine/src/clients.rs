// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lazily-started, cached RPC clients keyed by driver id. One client per
//! driver for the lifetime of a run; the Supervisor already guarantees one
//! process per driver id, this just mirrors that at the RPC layer.

use std::collections::HashMap;
use std::sync::Arc;

use drover_core::DriverId;
use drover_registry::DriverMetadata;
use drover_rpc::{HttpRpcClient, RpcClient, RpcClientError, WebSocketRpcClient};
use drover_steps::StepRegistry;
use drover_supervisor::Supervisor;
use drover_wire::{StepDefinition, Transport};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct ClientCache {
    clients: Mutex<HashMap<DriverId, Arc<dyn RpcClient>>>,
}

impl ClientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a driver is running and its RPC client is connected and
    /// initialized, returning the shared client. Subsequent calls for the
    /// same driver id reuse the same client without re-spawning or
    /// re-initializing. The first call for a driver also introspects its
    /// steps and feeds them into `steps`, so a driver whose patterns aren't
    /// declared in `driver.json` can still be routed to once it's live.
    pub async fn get_or_start(
        &self,
        meta: &DriverMetadata,
        supervisor: &Supervisor,
        driver_config: serde_json::Value,
        steps: &StepRegistry,
    ) -> Result<Arc<dyn RpcClient>, ClientStartError> {
        if let Some(client) = self.clients.lock().await.get(&meta.id) {
            return Ok(client.clone());
        }

        let record = supervisor.start(meta).await?;
        let client: Arc<dyn RpcClient> = match meta.transport {
            Transport::Websocket => {
                Arc::new(WebSocketRpcClient::new(meta.id, record.port))
            }
            Transport::Http => Arc::new(HttpRpcClient::new(meta.id, record.port)),
        };

        client.start().await?;
        client.initialize(driver_config).await?;
        introspect_steps(&*client, meta.id, steps).await;

        self.clients.lock().await.insert(meta.id, client.clone());
        Ok(client)
    }
}

/// Calls `introspect("steps")` and merges whatever the driver reports into
/// `steps`. Best-effort: a driver that doesn't support introspection, or
/// returns malformed data, just falls back to its static manifest steps —
/// introspection failure never fails the client start.
async fn introspect_steps(client: &dyn RpcClient, driver_id: DriverId, steps: &StepRegistry) {
    let payload = match client.introspect("steps").await {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(%driver_id, error = %e, "step introspection failed, relying on static manifest steps");
            return;
        }
    };

    match serde_json::from_value::<Vec<StepDefinition>>(payload) {
        Ok(definitions) if definitions.is_empty() => {}
        Ok(definitions) => steps.register_driver(driver_id, definitions),
        Err(e) => {
            tracing::warn!(%driver_id, error = %e, "driver returned malformed step introspection, skipping");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientStartError {
    #[error(transparent)]
    Startup(#[from] drover_core::DriverStartupError),
    #[error(transparent)]
    Rpc(#[from] RpcClientError),
}
