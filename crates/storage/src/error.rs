// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by [`crate::QueueStore`] implementations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    StorageUnavailable(String),
    #[error("task already exists: {0}")]
    Conflict(String),
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("runner not found: {0}")]
    RunnerNotFound(String),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("backend error: {0}")]
    Backend(String),
}
