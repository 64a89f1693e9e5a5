// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `drover` binary entry point. Commands return [`ExitError`] instead of
//! calling `std::process::exit` directly, so `main` owns process
//! termination.

mod cli;
mod config_load;
mod run;

use clap::Parser;
use drover_core::ExitError;

use cli::{Cli, Command};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = match dispatch(cli.command).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            err.code
        }
    };
    std::process::exit(code);
}

async fn dispatch(command: Command) -> Result<i32, ExitError> {
    let config = config_load::load(&command)?;
    drover_core::logging::init(config.log_level);

    match command {
        Command::Version => {
            println!("drover {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        Command::ListDrivers => run::list_drivers(config).await,
        Command::Run { feature, .. } => run::run_feature(config, &feature).await,
    }
}
