// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine-level errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] tq_storage::StorageError),
    #[error("supervisor is disabled for this project")]
    SupervisorDisabled,
    #[error("no executor installed")]
    NoExecutor,
    #[error("executor timed out after {0}ms")]
    ExecutorTimeout(u64),
    #[error("executor failed: {0}")]
    ExecutorFailure(String),
    #[error("output failed validation: {0}")]
    ValidationMajor(String),
}
