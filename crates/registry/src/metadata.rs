// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use drover_core::DriverId;
use drover_wire::{DriverManifest, StepDefinition, Transport};

/// A discovered driver, created once at discovery and never mutated.
#[derive(Debug, Clone)]
pub struct DriverMetadata {
    pub id: DriverId,
    pub name: String,
    pub version: String,
    /// Driver root directory (the parent of its `driver.json`).
    pub path: PathBuf,
    /// Resolved executable path, relative to `path`. Set by executable resolution,
    /// not re-probed at spawn time.
    pub executable: PathBuf,
    pub transport: Transport,
    pub config: serde_json::Value,
    pub supported_steps: Vec<StepDefinition>,
}

impl DriverMetadata {
    /// Build metadata from a parsed manifest, applying the directory-basename /
    /// `0.0.0` / websocket defaults documented in the manifest format.
    ///
    /// Neither the manifest `id` nor the directory basename has a length
    /// contract, so this can fail: two unrelated drivers whose names don't
    /// fit the id budget must be rejected rather than silently collide.
    pub fn from_manifest(
        dir: &std::path::Path,
        manifest: DriverManifest,
    ) -> Result<Self, drover_core::IdTooLong> {
        let basename = dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let id = manifest.id.clone().unwrap_or_else(|| basename.clone());
        Ok(Self {
            id: DriverId::from_string(id)?,
            name: manifest.name,
            version: manifest.version.unwrap_or_else(|| "0.0.0".to_string()),
            path: dir.to_path_buf(),
            executable: PathBuf::from(manifest.executable),
            transport: manifest.transport,
            config: manifest.config,
            supported_steps: manifest.supported_steps,
        })
    }
}
