// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pending-requests table shared between a client's public methods and
//! its single receiver task. One writer mutex around the socket send lives in
//! the transport itself; this table is mutex-protected independently.

use std::collections::HashMap;

use drover_core::RequestId;
use drover_wire::RpcResponse;
use parking_lot::Mutex;
use tokio::sync::oneshot;

#[derive(Default)]
pub struct PendingRequests {
    inner: Mutex<HashMap<RequestId, oneshot::Sender<RpcResponse>>>,
}

impl PendingRequests {
    pub fn register(&self, id: RequestId) -> oneshot::Receiver<RpcResponse> {
        let (tx, rx) = oneshot::channel();
        self.inner.lock().insert(id, tx);
        rx
    }

    /// Resolve the waiter for `response`'s id, if any. Unknown ids are dropped
    /// with a warning by the caller — they do not panic or error here.
    pub fn resolve(&self, response: RpcResponse) -> bool {
        if let Some(tx) = self.inner.lock().remove(response.id()) {
            let _ = tx.send(response);
            true
        } else {
            false
        }
    }

    pub fn abandon(&self, id: &RequestId) {
        self.inner.lock().remove(id);
    }

    /// Reject every outstanding waiter, e.g. on transport close. Dropping the
    /// sender trips the receiver with a `RecvError`.
    pub fn reject_all(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use drover_wire::RpcOutcome;

    use super::*;

    #[test]
    fn resolve_delivers_to_the_matching_waiter() {
        let pending = PendingRequests::default();
        let id = RequestId::from_string("req-1").unwrap();
        let mut rx = pending.register(id.clone());
        let response = RpcResponse::Response {
            id: id.clone(),
            outcome: RpcOutcome::Ok { result: serde_json::json!(null) },
        };
        assert!(pending.resolve(response));
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn resolve_returns_false_for_unknown_id() {
        let pending = PendingRequests::default();
        let response = RpcResponse::Response {
            id: RequestId::from_string("req-ghost").unwrap(),
            outcome: RpcOutcome::Ok { result: serde_json::json!(null) },
        };
        assert!(!pending.resolve(response));
    }

    #[test]
    fn reject_all_empties_the_table() {
        let pending = PendingRequests::default();
        pending.register(RequestId::from_string("req-1").unwrap());
        pending.register(RequestId::from_string("req-2").unwrap());
        assert_eq!(pending.len(), 2);
        pending.reject_all();
        assert!(pending.is_empty());
    }
}
