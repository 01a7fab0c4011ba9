// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error kinds that do not belong to a single crate boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error("template validation failed: {0}")]
    TemplateInvalid(String),
    #[error("config error: {0}")]
    Config(String),
}
