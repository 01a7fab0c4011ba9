// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk JSON store backend.
//!
//! Durable across restarts for a single process; not safe for concurrent
//! writers in separate processes (the write path here is whole-file
//! replace, not a conditional update). Every mutating call re-serializes
//! the in-process model to two sibling documents, `<state_dir>/queue/tasks.json`
//! and `<state_dir>/queue/runners.json`, using a write-tmp/fsync/rename/fsync-dir
//! durability sequence, so entries from other namespaces sharing the same
//! files are never lost on write.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::model::QueueModel;
use crate::traits::{
    ClaimResult, NamespaceSummary, QueueStore, RunnerWithStatus, StatusUpdateResult,
    StorageResult, TaskGroupSummary,
};
use crate::util::now_iso;
use tq_core::{
    ClarificationRequest, ConversationEntry, Namespace, ProgressEvent, QueueItem, RunnerId,
    RunnerRecord, SessionId, Status, TaskGroupId, TaskId, TaskType,
};

/// On-disk shape of `tasks.json`. `runners` here is always empty; the
/// sibling `runners.json` document is the source of truth for runner
/// records, this field is carried purely for shape compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TasksDocument {
    version: u32,
    namespace: String,
    tasks: BTreeMap<String, QueueItem>,
    #[serde(default)]
    runners: serde_json::Map<String, serde_json::Value>,
    last_modified: String,
}

pub struct FileQueueStore {
    model: Mutex<QueueModel>,
    tasks_path: PathBuf,
    runners_path: PathBuf,
}

impl FileQueueStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        let state_dir = state_dir.into();
        Self {
            model: Mutex::new(QueueModel::new()),
            tasks_path: tasks_file_path(&state_dir),
            runners_path: runners_file_path(&state_dir),
        }
    }

    fn load(&self) -> StorageResult<()> {
        let mut model = self.model.lock();
        if self.tasks_path.exists() {
            let content = std::fs::read_to_string(&self.tasks_path)?;
            let doc: TasksDocument = serde_json::from_str(&content)?;
            model.version = doc.version;
            model.tasks = doc.tasks;
        }
        if self.runners_path.exists() {
            let content = std::fs::read_to_string(&self.runners_path)?;
            model.runners = serde_json::from_str(&content)?;
        }
        Ok(())
    }

    /// Write both documents durably: tmp file, fsync, atomic rename, fsync
    /// directory, one sequence per document. `namespace` is recorded as
    /// `tasks.json`'s top-level `namespace` field (the namespace of whichever
    /// call triggered this write); it is informational only; namespace
    /// isolation itself is enforced by `QueueModel`'s scoped keys, not by
    /// this field.
    fn persist(&self, namespace: &str) -> StorageResult<()> {
        let (version, tasks, runners) = {
            let model = self.model.lock();
            (model.version, model.tasks.clone(), model.runners.clone())
        };

        let tasks_doc = TasksDocument {
            version,
            namespace: namespace.to_string(),
            tasks,
            runners: serde_json::Map::new(),
            last_modified: now_iso(),
        };
        write_atomic(&self.tasks_path, &serde_json::to_vec_pretty(&tasks_doc)?)?;
        write_atomic(&self.runners_path, &serde_json::to_vec_pretty(&runners)?)?;
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp_path, path)?;
    if let Some(parent) = path.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }
    Ok(())
}

macro_rules! mutate_and_persist {
    ($self:expr, $ns:expr, |$model:ident| $body:expr) => {{
        $self.load()?;
        let result = {
            let mut $model = $self.model.lock();
            $body
        };
        $self.persist($ns.as_ref())?;
        result
    }};
}

#[async_trait]
impl QueueStore for FileQueueStore {
    async fn ensure_table(&self) -> StorageResult<()> {
        if let Some(parent) = self.tasks_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if !self.tasks_path.exists() || !self.runners_path.exists() {
            self.persist("")?;
        } else {
            self.load()?;
        }
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
        mutate_and_persist!(self, namespace, |model| model.enqueue(
            namespace,
            session_id,
            task_group_id,
            prompt,
            task_id,
            task_type
        ))
    }

    async fn get_item(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
    ) -> StorageResult<Option<QueueItem>> {
        self.load()?;
        Ok(self.model.lock().get_item(namespace, task_id))
    }

    async fn claim(&self, namespace: &Namespace) -> StorageResult<ClaimResult> {
        self.load()?;
        let result = self.model.lock().claim(namespace);
        if result.success {
            self.persist(namespace.as_ref())?;
        }
        Ok(result)
    }

    async fn update_status(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        status: Status,
        error_message: Option<String>,
        output: Option<String>,
    ) -> StorageResult<()> {
        mutate_and_persist!(self, namespace, |model| model.update_status(
            namespace,
            task_id,
            status,
            error_message,
            output
        ))
    }

    async fn update_status_with_validation(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        new_status: Status,
    ) -> StorageResult<StatusUpdateResult> {
        mutate_and_persist!(self, namespace, |model| model.update_status_with_validation(
            namespace, task_id, new_status
        ))
    }

    async fn set_awaiting_response(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        clarification: ClarificationRequest,
        conversation_history: Option<Vec<ConversationEntry>>,
        output: Option<String>,
    ) -> StorageResult<StatusUpdateResult> {
        mutate_and_persist!(self, namespace, |model| model.set_awaiting_response(
            namespace,
            task_id,
            clarification,
            conversation_history,
            output
        ))
    }

    async fn resume_with_response(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        user_response: String,
    ) -> StorageResult<StatusUpdateResult> {
        mutate_and_persist!(self, namespace, |model| model.resume_with_response(
            namespace,
            task_id,
            user_response
        ))
    }

    async fn append_event(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        event: ProgressEvent,
    ) -> StorageResult<bool> {
        mutate_and_persist!(self, namespace, |model| Ok(model.append_event(namespace, task_id, event)))
    }

    async fn get_by_status(
        &self,
        namespace: &Namespace,
        status: Status,
    ) -> StorageResult<Vec<QueueItem>> {
        self.load()?;
        Ok(self.model.lock().get_by_status(namespace, status))
    }

    async fn get_by_task_group(
        &self,
        namespace: &Namespace,
        task_group_id: &TaskGroupId,
    ) -> StorageResult<Vec<QueueItem>> {
        self.load()?;
        Ok(self.model.lock().get_by_task_group(namespace, task_group_id))
    }

    async fn get_all_items(&self, namespace: &Namespace) -> StorageResult<Vec<QueueItem>> {
        self.load()?;
        Ok(self.model.lock().get_all_items(namespace))
    }

    async fn get_all_task_groups(
        &self,
        namespace: &Namespace,
    ) -> StorageResult<Vec<TaskGroupSummary>> {
        self.load()?;
        Ok(self.model.lock().get_all_task_groups(namespace))
    }

    async fn get_all_namespaces(&self) -> StorageResult<Vec<NamespaceSummary>> {
        self.load()?;
        Ok(self.model.lock().get_all_namespaces())
    }

    async fn recover_stale_tasks(
        &self,
        namespace: &Namespace,
        max_age_ms: i64,
    ) -> StorageResult<usize> {
        mutate_and_persist!(self, namespace, |model| Ok(model.recover_stale_tasks(namespace, max_age_ms)))
    }

    async fn update_runner_heartbeat(
        &self,
        namespace: &Namespace,
        runner_id: &RunnerId,
        project_root: String,
    ) -> StorageResult<()> {
        self.load()?;
        self.model
            .lock()
            .update_runner_heartbeat(namespace, runner_id, project_root);
        self.persist(namespace.as_ref())
    }

    async fn get_runner(
        &self,
        namespace: &Namespace,
        runner_id: &RunnerId,
    ) -> StorageResult<Option<RunnerRecord>> {
        self.load()?;
        Ok(self.model.lock().get_runner(namespace, runner_id))
    }

    async fn get_all_runners(&self, namespace: &Namespace) -> StorageResult<Vec<RunnerRecord>> {
        self.load()?;
        Ok(self.model.lock().get_all_runners(namespace))
    }

    async fn get_runners_with_status(
        &self,
        namespace: &Namespace,
        heartbeat_timeout_ms: Option<i64>,
    ) -> StorageResult<Vec<RunnerWithStatus>> {
        self.load()?;
        Ok(self
            .model
            .lock()
            .get_runners_with_status(namespace, heartbeat_timeout_ms))
    }

    async fn mark_runner_stopped(&self, namespace: &Namespace, runner_id: &RunnerId) -> StorageResult<()> {
        self.load()?;
        self.model.lock().mark_runner_stopped(namespace, runner_id);
        self.persist(namespace.as_ref())
    }

    async fn delete_runner(&self, namespace: &Namespace, runner_id: &RunnerId) -> StorageResult<()> {
        self.load()?;
        self.model.lock().delete_runner(namespace, runner_id);
        self.persist(namespace.as_ref())
    }
}

pub(crate) fn tasks_file_path(state_dir: &Path) -> PathBuf {
    state_dir.join("queue").join("tasks.json")
}

pub(crate) fn runners_file_path(state_dir: &Path) -> PathBuf {
    state_dir.join("queue").join("runners.json")
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
