// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use drover_core::DriverId;
use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Spawning,
    Ready,
    Running,
    Stopping,
    Exited,
}

/// One running driver instance. At most one live record per `driver_id`;
/// `port` is unique across all live records. Owned exclusively by the
/// Supervisor — nothing outside this crate mutates it directly.
pub struct ProcessRecord {
    pub driver_id: DriverId,
    pub pid: u32,
    pub port: u16,
    pub start_time_ms: u64,
    pub executable_basename: String,
    pub state: parking_lot::Mutex<ProcessState>,
    /// Signaled once the child has actually exited, so `Stop` can await reaping
    /// without racing the background reaper task.
    pub(crate) exited: Arc<Notify>,
}

impl ProcessRecord {
    pub fn state(&self) -> ProcessState {
        *self.state.lock()
    }

    pub fn set_state(&self, state: ProcessState) {
        *self.state.lock() = state;
    }
}
