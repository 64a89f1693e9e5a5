// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test harness for the root integration suite: a throwaway project
//! directory plus a small fluent wrapper around invoking the `drover` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// A temporary working directory the `drover` binary is invoked against.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self { dir: TempDir::new().expect("failed to create temp project dir") }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `relative`, creating parent directories as needed.
    pub fn file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent directories");
        }
        std::fs::write(&path, contents).expect("failed to write fixture file");
        path
    }

    /// Copy a fixture driver directory (e.g. `echo-driver`) under `drivers/`.
    pub fn install_driver(&self, fixture_name: &str) {
        let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(fixture_name);
        let dst = self.path().join("drivers").join(fixture_name);
        std::fs::create_dir_all(&dst).expect("failed to create drivers directory");
        for entry in std::fs::read_dir(&src).expect("fixture driver directory missing") {
            let entry = entry.expect("failed to read fixture driver entry");
            let target = dst.join(entry.file_name());
            std::fs::copy(entry.path(), &target).expect("failed to copy fixture driver file");
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let mut perms = std::fs::metadata(&target).unwrap().permissions();
                perms.set_mode(0o755);
                std::fs::set_permissions(&target, perms).expect("failed to mark fixture executable");
            }
        }
    }

    pub fn drover(&self) -> DroverCommand {
        DroverCommand {
            inner: Command::new(assert_cmd::cargo::cargo_bin("drover")),
            cwd: self.path().to_path_buf(),
            args: Vec::new(),
        }
    }
}

/// Fluent wrapper: build up args, then assert the exit status and inspect output.
pub struct DroverCommand {
    inner: Command,
    cwd: PathBuf,
    args: Vec<String>,
}

impl DroverCommand {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    fn run(mut self) -> Output {
        self.inner.current_dir(&self.cwd).args(&self.args);
        self.inner.output().expect("failed to spawn the drover binary")
    }

    pub fn passes(self) -> Finished {
        let output = self.run();
        assert!(
            output.status.success(),
            "expected exit 0, got {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
        Finished { output }
    }

    pub fn fails_with(self, code: i32) -> Finished {
        let output = self.run();
        assert_eq!(
            output.status.code(),
            Some(code),
            "stdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
        Finished { output }
    }
}

pub struct Finished {
    output: Output,
}

impl Finished {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout().contains(needle), "stdout did not contain {needle:?}:\n{}", self.stdout());
        self
    }
}

/// Poll `check` until it returns true or `max_ms` elapses.
pub fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + std::time::Duration::from_millis(max_ms);
    loop {
        if check() {
            return true;
        }
        if std::time::Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(std::time::Duration::from_millis(100));
    }
}
