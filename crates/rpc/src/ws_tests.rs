// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use drover_wire::{RpcOutcome, RpcResponse};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use super::*;

/// Spin up a bare WebSocket server that echoes every request back as a
/// success response with `{"echo": <params>}`.
async fn spawn_echo_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let (mut sink, mut stream) = ws.split();
            while let Some(Ok(Message::Text(text))) = stream.next().await {
                let req: RpcRequest = serde_json::from_str(&text).unwrap();
                let RpcRequest::Request { id, params, .. } = req;
                let response = RpcResponse::Response {
                    id,
                    outcome: RpcOutcome::Ok { result: serde_json::json!({ "echo": params }) },
                };
                let _ = sink.send(Message::Text(serde_json::to_string(&response).unwrap())).await;
            }
        }
    });
    port
}

#[tokio::test]
async fn execute_round_trips_through_the_echo_server() {
    let port = spawn_echo_server().await;
    let client = WebSocketRpcClient::new(DriverId::from_string("fake-driver").unwrap(), port);
    client.connect_with_retry().await.unwrap();

    let result = client.execute("greet", serde_json::json!({ "name": "world" })).await.unwrap();
    assert_eq!(result["echo"]["action"], "greet");
    assert_eq!(result["echo"]["args"]["name"], "world");
}

#[tokio::test]
async fn calling_without_connecting_first_fails_with_communication_error() {
    let client = WebSocketRpcClient::new(DriverId::from_string("fake-driver").unwrap(), 1);
    let err = client.execute("greet", serde_json::Value::Null).await.unwrap_err();
    assert!(matches!(err, RpcClientError::Communication(_)));
}
