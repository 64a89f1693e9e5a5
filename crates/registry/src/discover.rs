// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Driver discovery and the in-memory catalog.
//!
//! Walks a set of directories, parses what's found, and skips and warns on
//! anything malformed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use drover_core::{ConfigurationError, DriverId};
use drover_wire::DriverManifest;
use tokio::sync::{Mutex, Notify};

use crate::metadata::DriverMetadata;

const DISCOVERY_WAIT_TIMEOUT: Duration = Duration::from_secs(10);
const FALLBACK_EXECUTABLE_CANDIDATES: &[&str] = &["index.js", "driver.exe", "driver"];

/// Build the ordered list of directories to scan for driver subdirectories.
///
/// Order: `<cwd>/drivers`, `<exe-dir>/drivers`, an install-time path, then
/// `$DRIVER_DIR` if set (appended last so it supplements rather than shadows
/// the built-in locations).
pub fn search_paths(install_dir: Option<&Path>, driver_dir_env: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("drivers"));
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            paths.push(exe_dir.join("drivers"));
        }
    }
    if let Some(install) = install_dir {
        paths.push(install.to_path_buf());
    }
    if let Some(extra) = driver_dir_env {
        paths.push(extra.to_path_buf());
    }
    paths
}

enum CatalogState {
    NotStarted,
    InProgress,
    Ready(Arc<HashMap<DriverId, DriverMetadata>>),
}

/// The Driver Registry (C1): discovers driver manifests and serves the catalog.
///
/// `Initialize` is idempotent — a second concurrent caller waits for the first
/// scan to finish instead of re-scanning, bounded by [`DISCOVERY_WAIT_TIMEOUT`].
pub struct Registry {
    state: Mutex<CatalogState>,
    ready: Notify,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self { state: Mutex::new(CatalogState::NotStarted), ready: Notify::new() }
    }

    pub async fn initialize(&self, search_paths: &[PathBuf]) -> Result<(), ConfigurationError> {
        {
            let mut state = self.state.lock().await;
            match &*state {
                CatalogState::Ready(_) => return Ok(()),
                CatalogState::InProgress => {
                    drop(state);
                    return self.wait_for_ready().await;
                }
                CatalogState::NotStarted => {
                    *state = CatalogState::InProgress;
                }
            }
        }

        let catalog = discover_all(search_paths);
        let mut state = self.state.lock().await;
        *state = CatalogState::Ready(Arc::new(catalog));
        drop(state);
        self.ready.notify_waiters();
        Ok(())
    }

    async fn wait_for_ready(&self) -> Result<(), ConfigurationError> {
        tokio::time::timeout(DISCOVERY_WAIT_TIMEOUT, async {
            loop {
                {
                    let state = self.state.lock().await;
                    if matches!(&*state, CatalogState::Ready(_)) {
                        return;
                    }
                }
                self.ready.notified().await;
            }
        })
        .await
        .map_err(|_| ConfigurationError::DiscoveryTimeout(DISCOVERY_WAIT_TIMEOUT))
    }

    pub async fn get(&self, id: &DriverId) -> Option<DriverMetadata> {
        let state = self.state.lock().await;
        match &*state {
            CatalogState::Ready(catalog) => catalog.get(id).cloned(),
            _ => None,
        }
    }

    /// Stable discovery-order list of driver ids.
    pub async fn list(&self) -> Vec<DriverId> {
        let state = self.state.lock().await;
        match &*state {
            CatalogState::Ready(catalog) => catalog.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

fn discover_all(search_paths: &[PathBuf]) -> HashMap<DriverId, DriverMetadata> {
    let mut catalog = HashMap::new();
    for root in search_paths {
        if !root.exists() {
            continue;
        }
        let entries = match std::fs::read_dir(root) {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(path = %root.display(), error = %e, "skipping unreadable driver search path");
                continue;
            }
        };
        for entry in entries.flatten() {
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            match discover_one(&dir) {
                Ok(Some(meta)) => {
                    catalog.entry(meta.id.clone()).or_insert(meta);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(path = %dir.display(), error = %e, "skipping malformed driver manifest");
                }
            }
        }
    }
    catalog
}

fn discover_one(dir: &Path) -> Result<Option<DriverMetadata>, ConfigurationError> {
    let manifest_path = dir.join("driver.json");
    if !manifest_path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&manifest_path)?;
    let manifest: DriverManifest = serde_json::from_str(&content).map_err(|e| {
        ConfigurationError::InvalidManifest { path: manifest_path.clone(), reason: e.to_string() }
    })?;
    let mut meta = DriverMetadata::from_manifest(dir, manifest).map_err(|e| {
        ConfigurationError::InvalidManifest { path: manifest_path.clone(), reason: e.to_string() }
    })?;
    resolve_executable(&mut meta);
    Ok(Some(meta))
}

/// If the manifest's declared executable doesn't exist, probe common
/// alternatives before giving up. The manifest itself is not re-parsed;
/// only the resolved path changes.
fn resolve_executable(meta: &mut DriverMetadata) {
    let declared = meta.path.join(&meta.executable);
    if declared.exists() {
        return;
    }
    let native_named = meta.path.join(meta.id.suffix());
    if native_named.exists() {
        meta.executable = PathBuf::from(meta.id.suffix());
        return;
    }
    for candidate in FALLBACK_EXECUTABLE_CANDIDATES {
        if meta.path.join(candidate).exists() {
            meta.executable = PathBuf::from(candidate);
            return;
        }
    }
    tracing::warn!(
        driver_id = %meta.id,
        declared = %declared.display(),
        "driver executable not found, leaving declared path unresolved"
    );
}

#[cfg(test)]
#[path = "discover_tests.rs"]
mod tests;
