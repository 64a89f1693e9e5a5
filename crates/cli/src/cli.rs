// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line surface: `drover run`, `drover list-drivers`, `drover version`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "drover", version, about = "Driver orchestration runtime")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a feature file against the discovered driver fleet.
    Run {
        /// Path to the feature file.
        feature: PathBuf,
        /// Pre-start this driver instead of lazily starting per step.
        #[arg(long = "driver")]
        driver: Option<String>,
        /// JSON object merged into the driver's `initialize` config.
        #[arg(long = "driverConfig")]
        driver_config: Option<String>,
        /// Comma-separated tag filter, e.g. "smoke,fast".
        #[arg(long)]
        tags: Option<String>,
        /// Run scenarios concurrently up to `parallel_workers`.
        #[arg(long)]
        parallel: Option<bool>,
        /// Base path (no extension) for the JSON/HTML report artifacts.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// List every driver discovered on the configured search paths.
    ListDrivers,
    /// Print the host version.
    Version,
}
