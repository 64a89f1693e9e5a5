// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP/1.1 RPC transport: a fresh TCP connection per call, one RPC in
//! flight per connection so id correlation is implicit. Hand-rolled rather
//! than pulling in a full HTTP client crate.

use std::time::Duration;

use async_trait::async_trait;
use drover_core::{DriverCommunicationError, DriverId, RequestTimeout};
use drover_wire::{RpcError, RpcResponse};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::client::{RpcClient, RpcClientError};

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);
const HANDSHAKE_CALL_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpRpcClient {
    driver_id: DriverId,
    port: u16,
}

impl HttpRpcClient {
    pub fn new(driver_id: DriverId, port: u16) -> Self {
        Self { driver_id, port }
    }

    async fn post(
        &self,
        method: &str,
        body: serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value, RpcClientError> {
        let path = format!("/{method}");
        let payload = serde_json::to_string(&body).expect("request body always serializes");
        tokio::time::timeout(timeout, self.send(&path, &payload))
            .await
            .map_err(|_| RequestTimeout { driver_id: self.driver_id.to_string(), elapsed: timeout }.into())?
    }

    async fn send(&self, path: &str, body: &str) -> Result<serde_json::Value, RpcClientError> {
        let mut stream = TcpStream::connect(("127.0.0.1", self.port)).await.map_err(|e| {
            DriverCommunicationError::ConnectionClosed {
                driver_id: self.driver_id.to_string(),
                reason: format!("connect failed: {e}"),
            }
        })?;

        let request = format!(
            "POST {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len(),
        );
        stream.write_all(request.as_bytes()).await.map_err(|e| {
            DriverCommunicationError::ConnectionClosed {
                driver_id: self.driver_id.to_string(),
                reason: format!("write failed: {e}"),
            }
        })?;

        let mut reader = BufReader::new(&mut stream);
        let body = read_http_response(&mut reader, &self.driver_id).await?;
        let response: RpcResponse = serde_json::from_str(&body).map_err(|e| {
            DriverCommunicationError::MalformedMessage {
                driver_id: self.driver_id.to_string(),
                reason: e.to_string(),
            }
        })?;

        match response.into_result() {
            Ok(value) => Ok(value),
            Err(RpcError { code, message }) => Err(drover_core::DriverError { code, message }.into()),
        }
    }
}

async fn read_http_response<R: tokio::io::AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
    driver_id: &DriverId,
) -> Result<String, RpcClientError> {
    let io_err = |e: std::io::Error, what: &str| DriverCommunicationError::ConnectionClosed {
        driver_id: driver_id.to_string(),
        reason: format!("{what}: {e}"),
    };

    let mut status_line = String::new();
    reader.read_line(&mut status_line).await.map_err(|e| io_err(e, "read status"))?;
    let status_code =
        status_line.split_whitespace().nth(1).and_then(|s| s.parse::<u16>().ok()).unwrap_or(0);

    let mut content_length: usize = 0;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).await.map_err(|e| io_err(e, "read header"))?;
        if line == "\r\n" || line.is_empty() {
            break;
        }
        if let Some(val) = line.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = val.trim().parse().unwrap_or(0);
        }
    }

    let body = if content_length > 0 {
        let mut buf = vec![0u8; content_length];
        reader.read_exact(&mut buf).await.map_err(|e| io_err(e, "read body"))?;
        String::from_utf8_lossy(&buf).into_owned()
    } else {
        String::new()
    };

    if status_code >= 400 {
        return Err(DriverCommunicationError::ConnectionClosed {
            driver_id: driver_id.to_string(),
            reason: format!("HTTP {status_code}: {}", body.trim()),
        }
        .into());
    }

    Ok(body)
}

#[async_trait]
impl RpcClient for HttpRpcClient {
    async fn start(&self) -> Result<serde_json::Value, RpcClientError> {
        self.post("capabilities", serde_json::Value::Null, HANDSHAKE_CALL_TIMEOUT).await
    }

    async fn initialize(&self, config: serde_json::Value) -> Result<(), RpcClientError> {
        self.post("initialize", serde_json::json!({ "config": config }), DEFAULT_CALL_TIMEOUT).await?;
        Ok(())
    }

    async fn execute(
        &self,
        action: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, RpcClientError> {
        self.post("execute", serde_json::json!({ "action": action, "args": args }), DEFAULT_CALL_TIMEOUT)
            .await
    }

    async fn introspect(&self, kind: &str) -> Result<serde_json::Value, RpcClientError> {
        self.post("introspect", serde_json::json!({ "type": kind }), HANDSHAKE_CALL_TIMEOUT).await
    }

    async fn shutdown(&self) {
        let _ = self.post("shutdown", serde_json::Value::Null, Duration::from_secs(5)).await;
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
