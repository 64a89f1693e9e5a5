// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ephemeral port allocation: pick a pseudo-random port, prove it's free by
//! binding to it, then hand the freed port to the child process. A small race
//! exists between the probe and the child's own bind.

use std::net::TcpListener;

use drover_core::DriverStartupError;

const EPHEMERAL_RANGE_START: u16 = 49152;
const EPHEMERAL_RANGE_END: u16 = 65535;
const MAX_ATTEMPTS: u32 = 100;

pub fn allocate() -> Result<u16, DriverStartupError> {
    for _ in 0..MAX_ATTEMPTS {
        let candidate = random_ephemeral_port();
        if TcpListener::bind(("127.0.0.1", candidate)).is_ok() {
            return Ok(candidate);
        }
    }
    Err(DriverStartupError::PortExhausted { attempts: MAX_ATTEMPTS })
}

fn random_ephemeral_port() -> u16 {
    let span = (EPHEMERAL_RANGE_END - EPHEMERAL_RANGE_START) as u64 + 1;
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or(0);
    EPHEMERAL_RANGE_START + (nanos % span) as u16
}
