// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use drover_core::{ExitError, HostConfig};
use drover_engine::{report, Engine};
use drover_registry::{search_paths, Registry};

pub async fn list_drivers(config: HostConfig) -> Result<i32, ExitError> {
    let registry = Registry::new();
    let paths = search_paths(None, config.driver_dir.as_deref());
    registry.initialize(&paths).await?;

    let ids = registry.list().await;
    if ids.is_empty() {
        println!("No drivers found.");
        return Ok(0);
    }
    for id in ids {
        if let Some(meta) = registry.get(&id).await {
            println!("{:<24} {:<10} {}", meta.id.to_string(), meta.version, meta.path.display());
        }
    }
    Ok(0)
}

/// Run a feature file to completion, write the report artifacts, and return
/// the run's exit code (0 all passed, 1 any step failed).
pub async fn run_feature(config: HostConfig, feature: &Path) -> Result<i32, ExitError> {
    let report_path = config.report_path.clone().unwrap_or_else(|| Path::new("report").to_path_buf());

    let mut engine = Engine::new(config);
    engine.initialize().await?;

    let shutdown = engine.shutdown_token();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::warn!("shutdown signal received, stopping all drivers and writing a partial report");
        shutdown.cancel();
    });

    let start = std::time::Instant::now();
    let results = engine
        .run_feature(feature)
        .await
        .map_err(|e| ExitError::usage(format!("cannot read feature file: {e}")))?;
    let duration_ms = start.elapsed().as_millis() as u64;

    let run_report = engine.shutdown(duration_ms, results).await;

    if let Err(e) = report::write_artifacts(&run_report, &report_path) {
        tracing::warn!(error = %e, "failed to write report artifacts");
    }
    print!("{}", report::stdout_summary(&run_report));

    Ok(run_report.exit_code())
}

/// Waits for an interrupt (Ctrl-C) or, on unix, SIGTERM — whichever arrives
/// first. The host-level signal that propagates to the engine's
/// cancellation token.
#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm =
        signal(SignalKind::terminate()).expect("failed to install a SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
