// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line construction for a driver process.

use std::path::PathBuf;

use drover_core::Clock;
use drover_registry::DriverMetadata;
use tokio::process::Command;

/// Build the `tokio::process::Command` for spawning `meta` on `port`.
///
/// `.js` executables run under the platform script interpreter; anything else
/// is invoked directly. Working directory is always the driver's root.
pub fn build(meta: &DriverMetadata, port: u16, clock: &impl Clock) -> Command {
    let executable = meta.path.join(&meta.executable);
    let mut cmd = if is_interpreted(&executable) {
        let mut cmd = Command::new(node_interpreter());
        cmd.arg(&executable);
        cmd
    } else {
        Command::new(&executable)
    };

    cmd.arg("--port").arg(port.to_string());
    cmd.env("DRIVER_PORT", port.to_string());
    cmd.env("DRIVER_INSTANCE_ID", format!("{}-{}", meta.id, clock.epoch_ms()));
    cmd.current_dir(&meta.path);
    cmd.stdin(std::process::Stdio::null());
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());
    cmd
}

fn is_interpreted(executable: &std::path::Path) -> bool {
    executable.extension().and_then(|e| e.to_str()) == Some("js")
}

#[cfg(target_os = "windows")]
fn node_interpreter() -> &'static str {
    "node.exe"
}

#[cfg(not(target_os = "windows"))]
fn node_interpreter() -> &'static str {
    "node"
}

/// The basename used for [`crate::supervisor::Supervisor::emergency_cleanup`]'s
/// force-kill-by-name sweep.
pub fn executable_basename(meta: &DriverMetadata) -> String {
    meta.path
        .join(&meta.executable)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| meta.executable.to_string_lossy().into_owned())
}

/// What `emergency_cleanup` needs to find and kill a spawned driver process
/// after the fact. For a native executable, `comm` matching on the basename
/// is enough. For an interpreted driver the actual process is the
/// interpreter (`node`), not the script — `comm` matching the script's own
/// name can never find it, so the sweep also needs the full script path to
/// match against the interpreter's command line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KillTarget {
    pub basename: String,
    pub interpreter_script: Option<PathBuf>,
}

pub fn kill_target(meta: &DriverMetadata) -> KillTarget {
    let executable = meta.path.join(&meta.executable);
    KillTarget {
        basename: executable_basename(meta),
        interpreter_script: is_interpreted(&executable).then_some(executable),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use drover_core::{DriverId, FakeClock};
    use drover_wire::Transport;

    use super::*;

    fn meta(executable: &str) -> DriverMetadata {
        DriverMetadata {
            id: DriverId::from_string("example").unwrap(),
            name: "Example".to_string(),
            version: "0.0.0".to_string(),
            path: PathBuf::from("/drivers/example"),
            executable: PathBuf::from(executable),
            transport: Transport::Websocket,
            config: serde_json::Value::Null,
            supported_steps: vec![],
        }
    }

    #[test]
    fn js_executables_run_under_node() {
        let clock = FakeClock::new();
        let cmd = build(&meta("index.js"), 5000, &clock);
        assert_eq!(cmd.as_std().get_program(), node_interpreter());
    }

    #[test]
    fn native_executables_run_directly() {
        let clock = FakeClock::new();
        let cmd = build(&meta("driver"), 5000, &clock);
        assert_eq!(cmd.as_std().get_program(), "/drivers/example/driver");
    }

    #[test]
    fn basename_strips_directory() {
        assert_eq!(executable_basename(&meta("index.js")), "index.js");
    }

    #[test]
    fn kill_target_for_a_js_driver_carries_the_script_path() {
        let target = kill_target(&meta("index.js"));
        assert_eq!(target.basename, "index.js");
        assert_eq!(target.interpreter_script, Some(PathBuf::from("/drivers/example/index.js")));
    }

    #[test]
    fn kill_target_for_a_native_driver_has_no_interpreter_script() {
        let target = kill_target(&meta("driver"));
        assert_eq!(target.basename, "driver");
        assert_eq!(target.interpreter_script, None);
    }
}
