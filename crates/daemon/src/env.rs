// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon binary.

use std::path::PathBuf;

/// Resolve state directory: `TQ_STATE_DIR` > `XDG_STATE_HOME/tq` > `~/.local/state/tq`.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TQ_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("tq");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".local/state/tq")
}

/// Project root: `TQ_PROJECT_ROOT` or the current working directory.
pub fn project_root() -> PathBuf {
    std::env::var("TQ_PROJECT_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Command used to spawn the supervised companion server.
pub fn process_command() -> String {
    std::env::var("TQ_PROCESS_COMMAND").unwrap_or_else(|_| "tq-worker".to_string())
}

/// Port the supervised process serves its health endpoint on.
pub fn web_port() -> u16 {
    std::env::var("TQ_WEB_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(4000)
}

pub fn log_path(state_dir: &std::path::Path) -> PathBuf {
    state_dir.join("daemon.log")
}
