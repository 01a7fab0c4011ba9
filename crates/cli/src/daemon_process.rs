// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process control for the `tqd` daemon: start in the background, and
//! stop/probe it via the same PID-file + signal convention the daemon
//! itself doesn't need to know about.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::env;

fn pid_path() -> PathBuf {
    env::state_dir().join("runner.pid")
}

/// Start `tqd` in the background and record its PID. Returns the PID.
pub fn start_runner_background() -> Result<u32> {
    if let Some(pid) = read_runner_pid()? {
        if process_exists(pid) {
            return Ok(pid);
        }
    }

    let state_dir = env::state_dir();
    std::fs::create_dir_all(&state_dir)?;

    let child = Command::new(env::daemon_binary())
        .env("TQ_PROJECT_ROOT", env::project_root())
        .env("TQ_STATE_DIR", &state_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("failed to spawn tqd")?;

    let pid = child.id();
    std::fs::write(pid_path(), pid.to_string())?;
    std::mem::forget(child);
    Ok(pid)
}

/// Stop the runner with SIGTERM, escalating to SIGKILL after 10s.
pub fn stop_runner() -> Result<()> {
    let Some(pid) = read_runner_pid()? else {
        return Ok(());
    };
    if !process_exists(pid) {
        let _ = std::fs::remove_file(pid_path());
        return Ok(());
    }

    kill_signal("-15", pid);
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if !process_exists(pid) {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    if process_exists(pid) {
        kill_signal("-9", pid);
    }
    let _ = std::fs::remove_file(pid_path());
    Ok(())
}

pub fn read_runner_pid() -> Result<Option<u32>> {
    let path = pid_path();
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)?;
    Ok(content.trim().parse::<u32>().ok())
}

fn kill_signal(signal: &str, pid: u32) -> bool {
    Command::new("kill")
        .args([signal, &pid.to_string()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn process_exists(pid: u32) -> bool {
    kill_signal("-0", pid)
}
