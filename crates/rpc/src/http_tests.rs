// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::*;

/// Bare HTTP/1.1 server that reads one request and writes back the given
/// already-serialized `RpcResponse` body.
async fn spawn_server_responding_with(body: String) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = vec![0u8; 4096];
            let _ = stream.read(&mut buf).await.unwrap();
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
                body.len(),
            );
            let _ = stream.write_all(response.as_bytes()).await;
        }
    });
    port
}

/// Echoes the request body back as the `result` of a success `RpcResponse`,
/// so assertions can check what the client actually sent.
async fn spawn_echo_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = vec![0u8; 4096];
            let n = stream.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]);
            let body_start = request.find("\r\n\r\n").map(|i| i + 4).unwrap_or(request.len());
            let received: serde_json::Value =
                serde_json::from_str(&request[body_start..]).unwrap_or(serde_json::Value::Null);
            let response = RpcResponse::Response {
                id: drover_core::RequestId::from_string("req-echo").unwrap(),
                outcome: drover_wire::RpcOutcome::Ok { result: serde_json::json!({ "echo": received }) },
            };
            let body = serde_json::to_string(&response).unwrap();
            let http_response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
                body.len(),
            );
            let _ = stream.write_all(http_response.as_bytes()).await;
        }
    });
    port
}

#[tokio::test]
async fn execute_round_trips_through_the_echo_server() {
    let port = spawn_echo_server().await;
    let client = HttpRpcClient::new(DriverId::from_string("fake-driver").unwrap(), port);

    let result = client.execute("greet", serde_json::json!({ "name": "world" })).await.unwrap();
    assert_eq!(result["echo"]["action"], "greet");
    assert_eq!(result["echo"]["args"]["name"], "world");
}

#[tokio::test]
async fn an_error_response_body_surfaces_as_a_driver_error_not_a_success() {
    let response = RpcResponse::Response {
        id: drover_core::RequestId::from_string("req-err").unwrap(),
        outcome: drover_wire::RpcOutcome::Err {
            error: RpcError { code: 42, message: "action not supported".to_string() },
        },
    };
    let port = spawn_server_responding_with(serde_json::to_string(&response).unwrap()).await;
    let client = HttpRpcClient::new(DriverId::from_string("fake-driver").unwrap(), port);

    let err = client.execute("greet", serde_json::Value::Null).await.unwrap_err();
    match err {
        RpcClientError::Driver(e) => {
            assert_eq!(e.code, 42);
            assert_eq!(e.message, "action not supported");
        }
        other => panic!("expected RpcClientError::Driver, got {other:?}"),
    }
}

#[tokio::test]
async fn calling_a_closed_port_fails_with_communication_error() {
    let client = HttpRpcClient::new(DriverId::from_string("fake-driver").unwrap(), 1);
    let err = client.execute("greet", serde_json::Value::Null).await.unwrap_err();
    assert!(matches!(err, RpcClientError::Communication(_)));
}
