// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task and task-group identifiers.

crate::define_id! {
    /// Identifies a single queue item. Unique across all namespaces.
    pub struct TaskId;
}

crate::define_id! {
    /// Groups related queue items under one user-facing unit of work.
    pub struct TaskGroupId;
}
