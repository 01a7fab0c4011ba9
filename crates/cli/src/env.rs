// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI binary.

use std::path::PathBuf;

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

pub fn project_root() -> PathBuf {
    std::env::var("TQ_PROJECT_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

pub fn daemon_binary() -> PathBuf {
    std::env::var("TQ_DAEMON_BINARY")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("tqd"))
}
