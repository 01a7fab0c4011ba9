// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("preflight failed: {code}: {fix_hint}")]
    PreflightFailed { code: String, fix_hint: String },

    #[error("build failed: {0}")]
    BuildFailed(String),

    #[error("failed to spawn child process: {0}")]
    SpawnFailed(String),

    #[error("child process exited during startup wait (status: {0})")]
    ExitedDuringStartup(String),

    #[error("restart produced a PID identical to the previous one ({0}); this should be impossible")]
    PidUnchanged(u32),

    #[error("health check request failed: {0}")]
    HealthCheckFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

pub type SupervisorResult<T> = Result<T, SupervisorError>;
