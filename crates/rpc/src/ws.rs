// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket RPC transport.
//!
//! A single receiver task reads the socket and fans frames out, a mutex
//! guards the write half, and a reconnect policy kicks in on close.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use drover_core::{DriverCommunicationError, DriverId, DriverStartupError, RequestId, RequestTimeout};
use drover_wire::{RpcError, RpcOutcome, RpcRequest, RpcResponse};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex as AsyncMutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::client::{RpcClient, RpcClientError};
use crate::pending::PendingRequests;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);
const HANDSHAKE_CALL_TIMEOUT: Duration = Duration::from_secs(30);
const RECONNECT_ATTEMPTS: u32 = 3;

type WsSink = futures_util::stream::SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

pub struct WebSocketRpcClient {
    driver_id: DriverId,
    port: u16,
    pending: Arc<PendingRequests>,
    writer: AsyncMutex<Option<WsSink>>,
    next_id: AtomicU32,
}

impl WebSocketRpcClient {
    pub fn new(driver_id: DriverId, port: u16) -> Self {
        Self {
            driver_id,
            port,
            pending: Arc::new(PendingRequests::default()),
            writer: AsyncMutex::new(None),
            next_id: AtomicU32::new(0),
        }
    }

    fn next_request_id(&self) -> RequestId {
        // A plain counter fits the id budget regardless of the driver id's
        // own length; uniqueness only needs to hold within this client's
        // own pending-requests table.
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        RequestId::from_string(format!("{}{n}", RequestId::PREFIX))
            .expect("request id counter always fits the id budget")
    }

    async fn connect_with_retry(&self) -> Result<(), RpcClientError> {
        let mut attempt = 0;
        loop {
            match self.connect_once().await {
                Ok(()) => return Ok(()),
                Err(e) if attempt >= RECONNECT_ATTEMPTS => return Err(e),
                Err(_) => {
                    attempt += 1;
                    tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
                }
            }
        }
    }

    async fn connect_once(&self) -> Result<(), RpcClientError> {
        let uri = format!("ws://127.0.0.1:{}/", self.port);
        let connect = tokio_tungstenite::connect_async(&uri);
        let (ws, _) = tokio::time::timeout(CONNECT_TIMEOUT, connect).await.map_err(|_| {
            DriverCommunicationError::ConnectionClosed {
                driver_id: self.driver_id.to_string(),
                reason: "connect timed out".to_string(),
            }
        })?
        .map_err(|e| DriverCommunicationError::ConnectionClosed {
            driver_id: self.driver_id.to_string(),
            reason: e.to_string(),
        })?;

        let (sink, mut stream) = ws.split();
        *self.writer.lock().await = Some(sink);

        let pending = self.pending.clone();
        let driver_id = self.driver_id.clone();
        tokio::spawn(async move {
            while let Some(msg) = stream.next().await {
                match msg {
                    Ok(Message::Text(text)) => match serde_json::from_str::<RpcResponse>(&text) {
                        Ok(response) => {
                            if !pending.resolve(response) {
                                tracing::warn!(%driver_id, "response for unknown request id, dropping");
                            }
                        }
                        Err(e) => {
                            tracing::warn!(%driver_id, error = %e, "malformed RPC response, dropping");
                        }
                    },
                    Ok(Message::Close(_)) | Err(_) => break,
                    _ => {}
                }
            }
            pending.reject_all();
        });

        Ok(())
    }

    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value, RpcClientError> {
        let id = self.next_request_id();
        let request = RpcRequest::new(id.clone(), method, params);
        let body = serde_json::to_string(&request).expect("RpcRequest always serializes");
        let rx = self.pending.register(id.clone());

        {
            let mut writer = self.writer.lock().await;
            let sink = writer.as_mut().ok_or_else(|| DriverCommunicationError::ConnectionClosed {
                driver_id: self.driver_id.to_string(),
                reason: "not connected".to_string(),
            })?;
            sink.send(Message::Text(body)).await.map_err(|e| {
                DriverCommunicationError::ConnectionClosed {
                    driver_id: self.driver_id.to_string(),
                    reason: e.to_string(),
                }
            })?;
        }

        let response = match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => {
                return Err(DriverCommunicationError::ConnectionClosed {
                    driver_id: self.driver_id.to_string(),
                    reason: "connection closed while awaiting response".to_string(),
                }
                .into())
            }
            Err(_) => {
                self.pending.abandon(&id);
                return Err(RequestTimeout { driver_id: self.driver_id.to_string(), elapsed: timeout }.into());
            }
        };

        match response.into_result() {
            Ok(value) => Ok(value),
            Err(RpcError { code, message }) => {
                Err(drover_core::DriverError { code, message }.into())
            }
        }
    }
}

#[async_trait]
impl RpcClient for WebSocketRpcClient {
    async fn start(&self) -> Result<serde_json::Value, RpcClientError> {
        self.connect_with_retry().await?;
        self.call("capabilities", serde_json::Value::Null, HANDSHAKE_CALL_TIMEOUT).await
    }

    async fn initialize(&self, config: serde_json::Value) -> Result<(), RpcClientError> {
        self.call("initialize", serde_json::json!({ "config": config }), DEFAULT_CALL_TIMEOUT).await?;
        Ok(())
    }

    async fn execute(
        &self,
        action: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, RpcClientError> {
        self.call("execute", serde_json::json!({ "action": action, "args": args }), DEFAULT_CALL_TIMEOUT)
            .await
    }

    async fn introspect(&self, kind: &str) -> Result<serde_json::Value, RpcClientError> {
        self.call("introspect", serde_json::json!({ "type": kind }), HANDSHAKE_CALL_TIMEOUT).await
    }

    async fn shutdown(&self) {
        let _ = self.call("shutdown", serde_json::Value::Null, Duration::from_secs(5)).await;
        self.pending.reject_all();
        *self.writer.lock().await = None;
    }
}

/// Error surfaced when the Supervisor's readiness probe succeeds but the
/// first RPC handshake still fails — treated as a startup failure so the
/// driver never gets a half-initialized record.
pub fn handshake_failed(driver_id: &DriverId, cause: impl ToString) -> DriverStartupError {
    DriverStartupError::SpawnFailed {
        driver_id: driver_id.to_string(),
        executable: "<rpc handshake>".to_string(),
        cause: cause.to_string(),
    }
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
