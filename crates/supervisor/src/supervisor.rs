// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use drover_core::{Clock, DriverId, DriverStartupError, SystemClock};
use drover_registry::DriverMetadata;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::command::{self, KillTarget};
use crate::port;
use crate::readiness;
use crate::record::{ProcessRecord, ProcessState};

const GRACEFUL_STOP_TIMEOUT: Duration = Duration::from_secs(5);

enum SlotState {
    Starting(Arc<Notify>),
    Started(Arc<ProcessRecord>),
}

/// The Process Supervisor (C2): spawns, tracks, and tears down driver
/// processes. Parameterized over [`Clock`] so `DRIVER_INSTANCE_ID` generation
/// is deterministic in tests.
pub struct Supervisor<C: Clock = SystemClock> {
    clock: C,
    records: Arc<Mutex<HashMap<DriverId, SlotState>>>,
    /// Every process spawned in this host lifetime, for `emergency_cleanup`'s
    /// force-kill sweep.
    spawned_targets: Mutex<HashSet<KillTarget>>,
}

impl Supervisor<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for Supervisor<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + 'static> Supervisor<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            records: Arc::new(Mutex::new(HashMap::new())),
            spawned_targets: Mutex::new(HashSet::new()),
        }
    }

    /// Start `meta`'s process if not already running. Concurrent callers for
    /// the same driver id dedupe to a single spawn and share the result.
    pub async fn start(&self, meta: &DriverMetadata) -> Result<Arc<ProcessRecord>, DriverStartupError> {
        let wait_on = {
            let mut records = self.records.lock();
            match records.get(&meta.id) {
                Some(SlotState::Started(record)) => return Ok(record.clone()),
                Some(SlotState::Starting(notify)) => Some(notify.clone()),
                None => {
                    records.insert(meta.id.clone(), SlotState::Starting(Arc::new(Notify::new())));
                    None
                }
            }
        };

        if let Some(notify) = wait_on {
            notify.notified().await;
            let records = self.records.lock();
            return match records.get(&meta.id) {
                Some(SlotState::Started(record)) => Ok(record.clone()),
                _ => Err(DriverStartupError::SpawnFailed {
                    driver_id: meta.id.to_string(),
                    executable: meta.executable.display().to_string(),
                    cause: "concurrent start failed".to_string(),
                }),
            };
        }

        let result = self.spawn_and_wait(meta).await;
        let mut records = self.records.lock();
        match &result {
            Ok(record) => {
                let notify = match records.insert(meta.id.clone(), SlotState::Started(record.clone())) {
                    Some(SlotState::Starting(notify)) => notify,
                    _ => Arc::new(Notify::new()),
                };
                notify.notify_waiters();
            }
            Err(_) => {
                if let Some(SlotState::Starting(notify)) = records.remove(&meta.id) {
                    notify.notify_waiters();
                }
            }
        }
        result
    }

    async fn spawn_and_wait(&self, meta: &DriverMetadata) -> Result<Arc<ProcessRecord>, DriverStartupError> {
        let port = port::allocate()?;
        let target = command::kill_target(meta);
        let basename = target.basename.clone();
        self.spawned_targets.lock().insert(target);

        let mut cmd = command::build(meta, port, &self.clock);
        let mut child = cmd.spawn().map_err(|e| DriverStartupError::SpawnFailed {
            driver_id: meta.id.to_string(),
            executable: meta.executable.display().to_string(),
            cause: e.to_string(),
        })?;
        let pid = child.id().ok_or_else(|| DriverStartupError::SpawnFailed {
            driver_id: meta.id.to_string(),
            executable: meta.executable.display().to_string(),
            cause: "child exited before pid could be read".to_string(),
        })?;

        let exited = Arc::new(Notify::new());
        let reaper_exited = exited.clone();
        let reaper_driver_id = meta.id.clone();
        let reaper_records = self.records.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => {
                    tracing::info!(driver_id = %reaper_driver_id, %status, "driver process exited");
                }
                Err(e) => {
                    tracing::error!(driver_id = %reaper_driver_id, error = %e, "failed to wait on driver process");
                }
            }
            reaper_exited.notify_waiters();

            // Remove the record on an unexpected exit too, not just a planned
            // `stop()` — otherwise a crashed driver keeps reporting as
            // started forever and `start()` hands back its dead record.
            let mut records = reaper_records.lock();
            if let Some(SlotState::Started(record)) = records.get(&reaper_driver_id) {
                if record.pid == pid {
                    record.set_state(ProcessState::Exited);
                    records.remove(&reaper_driver_id);
                }
            }
        });

        match readiness::wait_for_ready(&meta.id, port).await {
            Ok(()) => {}
            Err(e) => {
                let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
                return Err(e);
            }
        }

        let record = Arc::new(ProcessRecord {
            driver_id: meta.id.clone(),
            pid,
            port,
            start_time_ms: self.clock.epoch_ms(),
            executable_basename: basename,
            state: parking_lot::Mutex::new(ProcessState::Ready),
            exited,
        });
        record.set_state(ProcessState::Running);
        Ok(record)
    }

    pub fn is_running(&self, id: &DriverId) -> bool {
        matches!(self.records.lock().get(id), Some(SlotState::Started(_)))
    }

    pub fn list(&self) -> Vec<Arc<ProcessRecord>> {
        self.records
            .lock()
            .values()
            .filter_map(|s| match s {
                SlotState::Started(record) => Some(record.clone()),
                SlotState::Starting(_) => None,
            })
            .collect()
    }

    /// Graceful SIGTERM, wait up to 5s, then SIGKILL. Always removes the record.
    pub async fn stop(&self, id: &DriverId) {
        let record = {
            let mut records = self.records.lock();
            match records.remove(id) {
                Some(SlotState::Started(record)) => record,
                _ => return,
            }
        };
        record.set_state(ProcessState::Stopping);
        let _ = signal::kill(Pid::from_raw(record.pid as i32), Signal::SIGTERM);

        let exited = record.exited.clone();
        if tokio::time::timeout(GRACEFUL_STOP_TIMEOUT, exited.notified()).await.is_err() {
            tracing::warn!(driver_id = %record.driver_id, pid = record.pid, "graceful stop timed out, force killing");
            let _ = signal::kill(Pid::from_raw(record.pid as i32), Signal::SIGKILL);
        }
        record.set_state(ProcessState::Exited);
    }

    /// Parallel `Stop` of every live record; per-driver failures are logged by
    /// `stop` itself and never halt the sweep.
    pub async fn stop_all(&self) {
        let ids: Vec<DriverId> = self.records.lock().keys().cloned().collect();
        futures_util::future::join_all(ids.iter().map(|id| self.stop(id))).await;
    }

    /// Last resort for crash paths: `StopAll`, then force-kill by executable
    /// name for every process ever spawned this host lifetime. Interpreted
    /// drivers are additionally swept by matching the interpreter's command
    /// line against the script path, since `comm` for those processes is the
    /// interpreter, not the script.
    pub async fn emergency_cleanup(&self) {
        self.stop_all().await;
        let targets: Vec<KillTarget> = self.spawned_targets.lock().iter().cloned().collect();
        for target in targets {
            force_kill_by_name(&target.basename);
            if let Some(script) = &target.interpreter_script {
                force_kill_by_cmdline(script);
            }
        }
    }
}

#[cfg(target_os = "windows")]
fn force_kill_by_name(basename: &str) {
    let _ = std::process::Command::new("taskkill").args(["/F", "/IM", basename]).output();
}

#[cfg(not(target_os = "windows"))]
fn force_kill_by_name(basename: &str) {
    let _ = std::process::Command::new("pkill").args(["-9", basename]).output();
}

/// Force-kills any process whose command line contains `script_path`,
/// regardless of its own executable name (`node`, `node.exe`, ...).
#[cfg(target_os = "windows")]
fn force_kill_by_cmdline(script_path: &std::path::Path) {
    let filter = format!("CommandLine like '%{}%'", script_path.display());
    let _ = std::process::Command::new("wmic")
        .args(["process", "where", &filter, "call", "terminate"])
        .output();
}

#[cfg(not(target_os = "windows"))]
fn force_kill_by_cmdline(script_path: &std::path::Path) {
    let _ = std::process::Command::new("pkill")
        .args(["-9", "-f", &script_path.display().to_string()])
        .output();
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
