// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Volatile, single-process store backend. Intended for development and
//! tests; not durable across restarts and not safe for multiple processes.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::StorageError;
use crate::model::QueueModel;
use crate::traits::{
    ClaimResult, NamespaceSummary, QueueStore, RunnerWithStatus, StatusUpdateResult,
    StorageResult, TaskGroupSummary,
};
use tq_core::{
    ClarificationRequest, ConversationEntry, Namespace, ProgressEvent, QueueItem, RunnerId,
    RunnerRecord, SessionId, Status, TaskGroupId, TaskId, TaskType,
};

/// In-memory `QueueStore`. Multiple claim callers within the same process
/// are correctly serialized by the mutex; this is the single-process
/// equivalent of the external backend's conditional write.
#[derive(Default)]
pub struct InMemoryQueueStore {
    model: Mutex<QueueModel>,
}

impl InMemoryQueueStore {
    pub fn new() -> Self {
        Self {
            model: Mutex::new(QueueModel::new()),
        }
    }
}

#[async_trait]
impl QueueStore for InMemoryQueueStore {
    async fn ensure_table(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn enqueue(
        &self,
        namespace: &Namespace,
        session_id: SessionId,
        task_group_id: TaskGroupId,
        prompt: String,
        task_id: Option<TaskId>,
        task_type: Option<TaskType>,
    ) -> StorageResult<QueueItem> {
        self.model
            .lock()
            .enqueue(namespace, session_id, task_group_id, prompt, task_id, task_type)
    }

    async fn get_item(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
    ) -> StorageResult<Option<QueueItem>> {
        Ok(self.model.lock().get_item(namespace, task_id))
    }

    async fn claim(&self, namespace: &Namespace) -> StorageResult<ClaimResult> {
        Ok(self.model.lock().claim(namespace))
    }

    async fn update_status(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        status: Status,
        error_message: Option<String>,
        output: Option<String>,
    ) -> StorageResult<()> {
        self.model
            .lock()
            .update_status(namespace, task_id, status, error_message, output)
    }

    async fn update_status_with_validation(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        new_status: Status,
    ) -> StorageResult<StatusUpdateResult> {
        self.model
            .lock()
            .update_status_with_validation(namespace, task_id, new_status)
    }

    async fn set_awaiting_response(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        clarification: ClarificationRequest,
        conversation_history: Option<Vec<ConversationEntry>>,
        output: Option<String>,
    ) -> StorageResult<StatusUpdateResult> {
        self.model.lock().set_awaiting_response(
            namespace,
            task_id,
            clarification,
            conversation_history,
            output,
        )
    }

    async fn resume_with_response(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        user_response: String,
    ) -> StorageResult<StatusUpdateResult> {
        self.model
            .lock()
            .resume_with_response(namespace, task_id, user_response)
    }

    async fn append_event(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        event: ProgressEvent,
    ) -> StorageResult<bool> {
        Ok(self.model.lock().append_event(namespace, task_id, event))
    }

    async fn get_by_status(
        &self,
        namespace: &Namespace,
        status: Status,
    ) -> StorageResult<Vec<QueueItem>> {
        Ok(self.model.lock().get_by_status(namespace, status))
    }

    async fn get_by_task_group(
        &self,
        namespace: &Namespace,
        task_group_id: &TaskGroupId,
    ) -> StorageResult<Vec<QueueItem>> {
        Ok(self.model.lock().get_by_task_group(namespace, task_group_id))
    }

    async fn get_all_items(&self, namespace: &Namespace) -> StorageResult<Vec<QueueItem>> {
        Ok(self.model.lock().get_all_items(namespace))
    }

    async fn get_all_task_groups(
        &self,
        namespace: &Namespace,
    ) -> StorageResult<Vec<TaskGroupSummary>> {
        Ok(self.model.lock().get_all_task_groups(namespace))
    }

    async fn get_all_namespaces(&self) -> StorageResult<Vec<NamespaceSummary>> {
        Ok(self.model.lock().get_all_namespaces())
    }

    async fn recover_stale_tasks(
        &self,
        namespace: &Namespace,
        max_age_ms: i64,
    ) -> StorageResult<usize> {
        Ok(self.model.lock().recover_stale_tasks(namespace, max_age_ms))
    }

    async fn update_runner_heartbeat(
        &self,
        namespace: &Namespace,
        runner_id: &RunnerId,
        project_root: String,
    ) -> StorageResult<()> {
        self.model
            .lock()
            .update_runner_heartbeat(namespace, runner_id, project_root);
        Ok(())
    }

    async fn get_runner(
        &self,
        namespace: &Namespace,
        runner_id: &RunnerId,
    ) -> StorageResult<Option<RunnerRecord>> {
        Ok(self.model.lock().get_runner(namespace, runner_id))
    }

    async fn get_all_runners(&self, namespace: &Namespace) -> StorageResult<Vec<RunnerRecord>> {
        Ok(self.model.lock().get_all_runners(namespace))
    }

    async fn get_runners_with_status(
        &self,
        namespace: &Namespace,
        heartbeat_timeout_ms: Option<i64>,
    ) -> StorageResult<Vec<RunnerWithStatus>> {
        Ok(self
            .model
            .lock()
            .get_runners_with_status(namespace, heartbeat_timeout_ms))
    }

    async fn mark_runner_stopped(&self, namespace: &Namespace, runner_id: &RunnerId) -> StorageResult<()> {
        self.model.lock().mark_runner_stopped(namespace, runner_id);
        Ok(())
    }

    async fn delete_runner(&self, namespace: &Namespace, runner_id: &RunnerId) -> StorageResult<()> {
        self.model.lock().delete_runner(namespace, runner_id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
