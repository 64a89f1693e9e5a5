// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-RPC envelope exchanged with a driver process.
//!
//! One JSON object per message, tagged by `type`; request/response pairs are
//! correlated by the caller-generated `id`.

use serde::{Deserialize, Serialize};

use drover_core::RequestId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RpcRequest {
    Request {
        id: RequestId,
        method: String,
        #[serde(default)]
        params: serde_json::Value,
    },
}

impl RpcRequest {
    pub fn new(id: RequestId, method: impl Into<String>, params: serde_json::Value) -> Self {
        Self::Request { id, method: method.into(), params }
    }

    pub fn id(&self) -> &RequestId {
        let Self::Request { id, .. } = self;
        id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RpcResponse {
    Response {
        id: RequestId,
        #[serde(flatten)]
        outcome: RpcOutcome,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RpcOutcome {
    Ok { result: serde_json::Value },
    Err { error: RpcError },
}

impl RpcResponse {
    pub fn id(&self) -> &RequestId {
        let Self::Response { id, .. } = self;
        id
    }

    pub fn into_result(self) -> Result<serde_json::Value, RpcError> {
        let Self::Response { outcome, .. } = self;
        match outcome {
            RpcOutcome::Ok { result } => Ok(result),
            RpcOutcome::Err { error } => Err(error),
        }
    }
}
