// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner identity and its heartbeat record.

use crate::Namespace;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifies one poller/runner process.
    pub struct RunnerId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunnerStatus {
    Running,
    Stopped,
}

/// Heartbeat record for one runner process, scoped to a namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerRecord {
    pub namespace: Namespace,
    pub runner_id: RunnerId,
    pub project_root: String,
    pub status: RunnerStatus,
    pub started_at: String,
    pub last_heartbeat: String,
    pub last_heartbeat_ms: i64,
}

/// Default window after which a runner with no heartbeat is considered dead.
pub const DEFAULT_HEARTBEAT_TIMEOUT_MS: i64 = 120_000;

impl RunnerRecord {
    /// Whether this runner is alive as of `now_ms`, given a heartbeat timeout.
    pub fn is_alive(&self, now_ms: i64, heartbeat_timeout_ms: i64) -> bool {
        self.status == RunnerStatus::Running
            && now_ms - self.last_heartbeat_ms < heartbeat_timeout_ms
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
