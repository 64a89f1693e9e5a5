// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process Supervisor: spawns driver processes, waits for readiness, and owns
//! their lifecycle through to termination.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod command;
mod port;
mod readiness;
mod record;
mod supervisor;

pub use record::{ProcessRecord, ProcessState};
pub use supervisor::Supervisor;
