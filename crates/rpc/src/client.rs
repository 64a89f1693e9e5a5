// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use drover_core::{DriverCommunicationError, DriverError, RequestTimeout};

/// Transport-agnostic contract implemented by the WebSocket and HTTP clients.
///
/// A small async trait with one implementation per transport, shared error type.
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Open the transport and perform the initial `capabilities` call.
    async fn start(&self) -> Result<serde_json::Value, RpcClientError>;

    async fn initialize(&self, config: serde_json::Value) -> Result<(), RpcClientError>;

    async fn execute(
        &self,
        action: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, RpcClientError>;

    async fn introspect(&self, kind: &str) -> Result<serde_json::Value, RpcClientError>;

    /// Best-effort polite shutdown, then close the socket. Always succeeds from
    /// the caller's perspective — failures are logged, not propagated.
    async fn shutdown(&self);
}

#[derive(Debug, thiserror::Error)]
pub enum RpcClientError {
    #[error(transparent)]
    Communication(#[from] DriverCommunicationError),
    #[error(transparent)]
    Timeout(#[from] RequestTimeout),
    #[error(transparent)]
    Driver(#[from] DriverError),
}
