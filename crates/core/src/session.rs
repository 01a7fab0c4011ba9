// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identifier for the caller that created a task.

crate::define_id! {
    /// Identifies an end-user or automation session that enqueued tasks.
    pub struct SessionId;
}
