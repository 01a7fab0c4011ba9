// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `QueueStore` contract: durable task/runner persistence with
//! at-most-one-claimer semantics and validated status transitions.
//!
//! Every backend (in-memory, file-JSON, external document store) implements
//! this trait identically from the caller's perspective; only the
//! concurrency guarantees of `claim()` differ (see each module's doc
//! comment).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use tq_core::{
    ClarificationRequest, ConversationEntry, Namespace, ProgressEvent, QueueItem, RunnerId,
    RunnerRecord, SessionId, Status, TaskGroupId, TaskId, TaskType,
};

pub type StorageResult<T> = Result<T, StorageError>;

/// Outcome of a `claim()` attempt.
#[derive(Debug, Clone, Default)]
pub struct ClaimResult {
    pub success: bool,
    pub item: Option<QueueItem>,
    pub error: Option<String>,
}

/// Outcome of a validated status transition attempt.
#[derive(Debug, Clone)]
pub struct StatusUpdateResult {
    pub success: bool,
    pub task_id: TaskId,
    pub old_status: Option<Status>,
    pub new_status: Option<Status>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl StatusUpdateResult {
    pub fn ok(task_id: TaskId, old_status: Status, new_status: Status) -> Self {
        Self {
            success: true,
            task_id,
            old_status: Some(old_status),
            new_status: Some(new_status),
            error: None,
            message: None,
        }
    }

    pub fn rejected(task_id: TaskId, old_status: Status, message: impl Into<String>) -> Self {
        Self {
            success: false,
            task_id,
            old_status: Some(old_status),
            new_status: None,
            error: Some("invalid transition".to_string()),
            message: Some(message.into()),
        }
    }
}

/// Aggregated counts for one task group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskGroupSummary {
    pub task_group_id: TaskGroupId,
    pub namespace: Namespace,
    pub total: usize,
    pub queued: usize,
    pub running: usize,
    pub awaiting_response: usize,
    pub complete: usize,
    pub error: usize,
    pub cancelled: usize,
}

/// Aggregated counts and runner liveness for one namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceSummary {
    pub namespace: Namespace,
    pub task_count: usize,
    pub runner_count: usize,
    pub alive_runner_count: usize,
}

/// A runner record annotated with liveness as of the query time.
#[derive(Debug, Clone)]
pub struct RunnerWithStatus {
    pub record: RunnerRecord,
    pub is_alive: bool,
}

#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Idempotent: ensures backing storage exists. Safe to call repeatedly
    /// (R3).
    async fn ensure_table(&self) -> StorageResult<()>;

    /// Create a new item in `QUEUED`. If `task_id` is supplied and already
    /// present, returns `Conflict`.
    #[allow(clippy::too_many_arguments)]
    async fn enqueue(
        &self,
        namespace: &Namespace,
        session_id: SessionId,
        task_group_id: TaskGroupId,
        prompt: String,
        task_id: Option<TaskId>,
        task_type: Option<TaskType>,
    ) -> StorageResult<QueueItem>;

    async fn get_item(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
    ) -> StorageResult<Option<QueueItem>>;

    /// Atomically claim the oldest `QUEUED` item in `namespace` (P1, P4).
    async fn claim(&self, namespace: &Namespace) -> StorageResult<ClaimResult>;

    /// Unconditional write used by the poller once execution has finished.
    async fn update_status(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        status: Status,
        error_message: Option<String>,
        output: Option<String>,
    ) -> StorageResult<()>;

    /// Validated write: rejects illegal transitions (P2).
    async fn update_status_with_validation(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        new_status: Status,
    ) -> StorageResult<StatusUpdateResult>;

    /// `RUNNING -> AWAITING_RESPONSE`. Rejects if the current status is not
    /// `RUNNING`.
    async fn set_awaiting_response(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        clarification: ClarificationRequest,
        conversation_history: Option<Vec<ConversationEntry>>,
        output: Option<String>,
    ) -> StorageResult<StatusUpdateResult>;

    /// `AWAITING_RESPONSE -> QUEUED`, appending a user entry to the
    /// conversation history. Rejects if the current status is not
    /// `AWAITING_RESPONSE`.
    async fn resume_with_response(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        user_response: String,
    ) -> StorageResult<StatusUpdateResult>;

    /// Append a progress event (I5 cap enforced). Returns whether the task
    /// existed.
    async fn append_event(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        event: ProgressEvent,
    ) -> StorageResult<bool>;

    async fn get_by_status(
        &self,
        namespace: &Namespace,
        status: Status,
    ) -> StorageResult<Vec<QueueItem>>;

    async fn get_by_task_group(
        &self,
        namespace: &Namespace,
        task_group_id: &TaskGroupId,
    ) -> StorageResult<Vec<QueueItem>>;

    async fn get_all_items(&self, namespace: &Namespace) -> StorageResult<Vec<QueueItem>>;

    async fn get_all_task_groups(&self, namespace: &Namespace)
        -> StorageResult<Vec<TaskGroupSummary>>;

    async fn get_all_namespaces(&self) -> StorageResult<Vec<NamespaceSummary>>;

    /// Transition every `RUNNING` task older than `max_age_ms` to `ERROR`
    /// (P6). Returns the count recovered.
    async fn recover_stale_tasks(
        &self,
        namespace: &Namespace,
        max_age_ms: i64,
    ) -> StorageResult<usize>;

    async fn update_runner_heartbeat(
        &self,
        namespace: &Namespace,
        runner_id: &RunnerId,
        project_root: String,
    ) -> StorageResult<()>;

    async fn get_runner(
        &self,
        namespace: &Namespace,
        runner_id: &RunnerId,
    ) -> StorageResult<Option<RunnerRecord>>;

    async fn get_all_runners(&self, namespace: &Namespace) -> StorageResult<Vec<RunnerRecord>>;

    async fn get_runners_with_status(
        &self,
        namespace: &Namespace,
        heartbeat_timeout_ms: Option<i64>,
    ) -> StorageResult<Vec<RunnerWithStatus>>;

    async fn mark_runner_stopped(
        &self,
        namespace: &Namespace,
        runner_id: &RunnerId,
    ) -> StorageResult<()>;

    async fn delete_runner(&self, namespace: &Namespace, runner_id: &RunnerId) -> StorageResult<()>;
}
