// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build provenance for the supervised child process, persisted at
//! `<project_root>/dist/build-meta.json` and read back on the next supervisor
//! start so restarts can tell whether the binary actually changed.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::SupervisorResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMeta {
    pub build_sha: String,
    pub build_timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
}

impl BuildMeta {
    /// Build metadata for "right now": `git rev-parse --short HEAD` if a git
    /// checkout is available, else a timestamp-derived synthetic sha.
    pub fn capture() -> Self {
        let git_sha = git_output(&["rev-parse", "--short", "HEAD"]);
        let git_branch = git_output(&["rev-parse", "--abbrev-ref", "HEAD"]);
        let build_sha = git_sha.clone().unwrap_or_else(|| format!("build-{}", epoch_ms()));

        Self {
            build_sha,
            build_timestamp: chrono::Utc::now().to_rfc3339(),
            git_sha,
            git_branch,
        }
    }

    pub fn path(project_root: &Path) -> PathBuf {
        project_root.join("dist").join("build-meta.json")
    }

    pub fn load(project_root: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(Self::path(project_root)).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn persist(&self, project_root: &Path) -> SupervisorResult<()> {
        let path = Self::path(project_root);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }
}

fn git_output(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let s = String::from_utf8(output.stdout).ok()?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn epoch_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "build_meta_tests.rs"]
mod tests;
