// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Readiness polling: poll on a fixed interval up to a total budget, bail
//! with a descriptive timeout.

use std::time::Duration;

use drover_core::{DriverId, DriverStartupError};
use tokio::net::TcpStream;

const POLL_INTERVAL: Duration = Duration::from_millis(500);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
const READY_BUDGET: Duration = Duration::from_secs(30);

/// Poll `127.0.0.1:port` until a TCP connection succeeds or the budget expires.
pub async fn wait_for_ready(driver_id: &DriverId, port: u16) -> Result<(), DriverStartupError> {
    let deadline = tokio::time::Instant::now() + READY_BUDGET;
    loop {
        let attempt = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(("127.0.0.1", port))).await;
        if let Ok(Ok(_)) = attempt {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(DriverStartupError::ReadinessTimeout {
                driver_id: driver_id.to_string(),
                elapsed: READY_BUDGET,
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn succeeds_once_listener_is_up() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let _ = listener.accept().await;
        });
        let id = DriverId::from_string("example").unwrap();
        wait_for_ready(&id, port).await.unwrap();
    }
}
