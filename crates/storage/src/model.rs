// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pure in-process data model shared by the in-memory and file backends.
//!
//! Both backends hold one `QueueModel` behind a lock; the file backend
//! additionally serializes it to disk after every mutation. Keeping the
//! transition logic here means the two backends cannot drift.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::traits::{
    ClaimResult, NamespaceSummary, RunnerWithStatus, StatusUpdateResult, StorageResult,
    TaskGroupSummary,
};
use crate::util::now_iso;
use tq_core::{
    scoped_name, split_scoped_name, ClarificationRequest, ConversationEntry, ConversationRole,
    Namespace, ProgressEvent, QueueItem, RunnerId, RunnerRecord, RunnerStatus, SessionId, Status,
    TaskGroupId, TaskId, TaskType,
};

/// Current on-disk schema version for the file backend's JSON documents.
pub const MODEL_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueModel {
    pub version: u32,
    pub tasks: BTreeMap<String, QueueItem>,
    pub runners: BTreeMap<String, RunnerRecord>,
}

impl QueueModel {
    pub fn new() -> Self {
        Self {
            version: MODEL_VERSION,
            tasks: BTreeMap::new(),
            runners: BTreeMap::new(),
        }
    }

    pub fn enqueue(
        &mut self,
        namespace: &Namespace,
        session_id: SessionId,
        task_group_id: TaskGroupId,
        prompt: String,
        task_id: Option<TaskId>,
        task_type: Option<TaskType>,
    ) -> StorageResult<QueueItem> {
        let task_id = task_id.unwrap_or_else(|| TaskId::new(uuid::Uuid::new_v4().to_string()));
        let key = scoped_name(namespace.as_ref(), task_id.as_str());
        if self.tasks.contains_key(&key) {
            return Err(StorageError::Conflict(task_id.as_str().to_string()));
        }
        let now = now_iso();
        let item = QueueItem {
            namespace: namespace.clone(),
            task_id,
            task_group_id,
            session_id,
            status: Status::Queued,
            prompt,
            created_at: now.clone(),
            updated_at: now,
            task_type,
            error_message: None,
            output: None,
            clarification: None,
            conversation_history: None,
            events: None,
        };
        self.tasks.insert(key, item.clone());
        Ok(item)
    }

    pub fn get_item(&self, namespace: &Namespace, task_id: &TaskId) -> Option<QueueItem> {
        let key = scoped_name(namespace.as_ref(), task_id.as_str());
        self.tasks.get(&key).cloned()
    }

    /// Select the oldest `QUEUED` item in `namespace` and transition it to
    /// `RUNNING`. Ordered by `created_at` ascending, ties broken by
    /// `task_id` (stable order).
    pub fn claim(&mut self, namespace: &Namespace) -> ClaimResult {
        let candidate_key = self
            .tasks
            .iter()
            .filter(|(k, v)| {
                belongs_to(k, namespace.as_ref()) && v.status == Status::Queued
            })
            .min_by(|(ka, va), (kb, vb)| {
                va.created_at
                    .cmp(&vb.created_at)
                    .then_with(|| ka.cmp(kb))
            })
            .map(|(k, _)| k.clone());

        let Some(key) = candidate_key else {
            return ClaimResult {
                success: false,
                item: None,
                error: None,
            };
        };

        // Conditional transition: re-check status under the same lock acquisition
        // (single-process model; the file/dynamodb backends re-derive this
        // exact check against their own source of truth before committing).
        match self.tasks.get_mut(&key) {
            Some(item) if item.status == Status::Queued => {
                item.status = Status::Running;
                item.updated_at = now_iso();
                ClaimResult {
                    success: true,
                    item: Some(item.clone()),
                    error: None,
                }
            }
            Some(_) => ClaimResult {
                success: false,
                item: None,
                error: Some("already claimed".to_string()),
            },
            None => ClaimResult {
                success: false,
                item: None,
                error: None,
            },
        }
    }

    pub fn update_status(
        &mut self,
        namespace: &Namespace,
        task_id: &TaskId,
        status: Status,
        error_message: Option<String>,
        output: Option<String>,
    ) -> StorageResult<()> {
        let key = scoped_name(namespace.as_ref(), task_id.as_str());
        let item = self
            .tasks
            .get_mut(&key)
            .ok_or_else(|| StorageError::NotFound(task_id.as_str().to_string()))?;
        item.status = status;
        item.updated_at = now_iso();
        if error_message.is_some() {
            item.error_message = error_message;
        }
        if output.is_some() {
            item.output = output;
        }
        Ok(())
    }

    pub fn update_status_with_validation(
        &mut self,
        namespace: &Namespace,
        task_id: &TaskId,
        new_status: Status,
    ) -> StorageResult<StatusUpdateResult> {
        let key = scoped_name(namespace.as_ref(), task_id.as_str());
        let item = self
            .tasks
            .get_mut(&key)
            .ok_or_else(|| StorageError::NotFound(task_id.as_str().to_string()))?;
        let old_status = item.status;
        if !old_status.can_transition_to(new_status) {
            return Ok(StatusUpdateResult::rejected(
                task_id.clone(),
                old_status,
                format!("cannot transition from {old_status} to {new_status}"),
            ));
        }
        item.status = new_status;
        item.updated_at = now_iso();
        Ok(StatusUpdateResult::ok(task_id.clone(), old_status, new_status))
    }

    pub fn set_awaiting_response(
        &mut self,
        namespace: &Namespace,
        task_id: &TaskId,
        clarification: ClarificationRequest,
        conversation_history: Option<Vec<ConversationEntry>>,
        output: Option<String>,
    ) -> StorageResult<StatusUpdateResult> {
        let key = scoped_name(namespace.as_ref(), task_id.as_str());
        let item = self
            .tasks
            .get_mut(&key)
            .ok_or_else(|| StorageError::NotFound(task_id.as_str().to_string()))?;
        let old_status = item.status;
        if old_status != Status::Running {
            return Ok(StatusUpdateResult::rejected(
                task_id.clone(),
                old_status,
                "set_awaiting_response requires RUNNING".to_string(),
            ));
        }
        item.status = Status::AwaitingResponse;
        item.updated_at = now_iso();
        item.clarification = Some(clarification);
        if let Some(history) = conversation_history {
            item.conversation_history = Some(history);
        }
        if output.is_some() {
            item.output = output;
        }
        Ok(StatusUpdateResult::ok(
            task_id.clone(),
            old_status,
            Status::AwaitingResponse,
        ))
    }

    pub fn resume_with_response(
        &mut self,
        namespace: &Namespace,
        task_id: &TaskId,
        user_response: String,
    ) -> StorageResult<StatusUpdateResult> {
        let key = scoped_name(namespace.as_ref(), task_id.as_str());
        let item = self
            .tasks
            .get_mut(&key)
            .ok_or_else(|| StorageError::NotFound(task_id.as_str().to_string()))?;
        let old_status = item.status;
        if old_status != Status::AwaitingResponse {
            return Ok(StatusUpdateResult::rejected(
                task_id.clone(),
                old_status,
                "resume_with_response requires AWAITING_RESPONSE".to_string(),
            ));
        }
        let now = now_iso();
        item.push_conversation_entry(ConversationEntry {
            role: ConversationRole::User,
            content: user_response,
            timestamp: now.clone(),
        });
        item.status = Status::Queued;
        item.updated_at = now;
        Ok(StatusUpdateResult::ok(
            task_id.clone(),
            old_status,
            Status::Queued,
        ))
    }

    pub fn append_event(
        &mut self,
        namespace: &Namespace,
        task_id: &TaskId,
        event: ProgressEvent,
    ) -> bool {
        let key = scoped_name(namespace.as_ref(), task_id.as_str());
        match self.tasks.get_mut(&key) {
            Some(item) => {
                let ts = event.timestamp.clone();
                item.push_event(event);
                item.updated_at = if ts.is_empty() { now_iso() } else { ts };
                true
            }
            None => false,
        }
    }

    pub fn get_by_status(&self, namespace: &Namespace, status: Status) -> Vec<QueueItem> {
        let mut items: Vec<QueueItem> = self
            .tasks
            .iter()
            .filter(|(k, v)| belongs_to(k, namespace.as_ref()) && v.status == status)
            .map(|(_, v)| v.clone())
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        items
    }

    pub fn get_by_task_group(
        &self,
        namespace: &Namespace,
        task_group_id: &TaskGroupId,
    ) -> Vec<QueueItem> {
        let mut items: Vec<QueueItem> = self
            .tasks
            .iter()
            .filter(|(k, v)| belongs_to(k, namespace.as_ref()) && &v.task_group_id == task_group_id)
            .map(|(_, v)| v.clone())
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        items
    }

    pub fn get_all_items(&self, namespace: &Namespace) -> Vec<QueueItem> {
        let mut items: Vec<QueueItem> = self
            .tasks
            .iter()
            .filter(|(k, _)| belongs_to(k, namespace.as_ref()))
            .map(|(_, v)| v.clone())
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        items
    }

    pub fn get_all_task_groups(&self, namespace: &Namespace) -> Vec<TaskGroupSummary> {
        let mut by_group: BTreeMap<String, TaskGroupSummary> = BTreeMap::new();
        for item in self.get_all_items(namespace) {
            let entry = by_group
                .entry(item.task_group_id.as_str().to_string())
                .or_insert_with(|| TaskGroupSummary {
                    task_group_id: item.task_group_id.clone(),
                    namespace: namespace.clone(),
                    total: 0,
                    queued: 0,
                    running: 0,
                    awaiting_response: 0,
                    complete: 0,
                    error: 0,
                    cancelled: 0,
                });
            entry.total += 1;
            match item.status {
                Status::Queued => entry.queued += 1,
                Status::Running => entry.running += 1,
                Status::AwaitingResponse => entry.awaiting_response += 1,
                Status::Complete => entry.complete += 1,
                Status::Error => entry.error += 1,
                Status::Cancelled => entry.cancelled += 1,
            }
        }
        by_group.into_values().collect()
    }

    pub fn get_all_namespaces(&self) -> Vec<NamespaceSummary> {
        let mut task_counts: BTreeMap<String, usize> = BTreeMap::new();
        for key in self.tasks.keys() {
            let (ns, _) = split_scoped_name(key);
            *task_counts.entry(ns.to_string()).or_insert(0) += 1;
        }
        let mut runner_counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        let now_ms = crate::util::iso_to_ms(&now_iso());
        for (key, record) in &self.runners {
            let (ns, _) = split_scoped_name(key);
            let entry = runner_counts.entry(ns.to_string()).or_insert((0, 0));
            entry.0 += 1;
            if record.is_alive(now_ms, tq_core::runner::DEFAULT_HEARTBEAT_TIMEOUT_MS) {
                entry.1 += 1;
            }
        }
        let mut namespaces: std::collections::BTreeSet<String> =
            task_counts.keys().cloned().collect();
        namespaces.extend(runner_counts.keys().cloned());
        namespaces
            .into_iter()
            .map(|ns| {
                let task_count = task_counts.get(&ns).copied().unwrap_or(0);
                let (runner_count, alive_runner_count) =
                    runner_counts.get(&ns).copied().unwrap_or((0, 0));
                NamespaceSummary {
                    namespace: Namespace::new(ns),
                    task_count,
                    runner_count,
                    alive_runner_count,
                }
            })
            .collect()
    }

    pub fn recover_stale_tasks(&mut self, namespace: &Namespace, max_age_ms: i64) -> usize {
        let now_ms = crate::util::iso_to_ms(&now_iso());
        let mut recovered = 0;
        for (key, item) in self.tasks.iter_mut() {
            if !belongs_to(key, namespace.as_ref()) || item.status != Status::Running {
                continue;
            }
            let updated_ms = crate::util::iso_to_ms(&item.updated_at);
            let age_ms = now_ms - updated_ms;
            if age_ms > max_age_ms {
                item.status = Status::Error;
                item.error_message = Some(format!(
                    "Task stale: running for {}s without completion",
                    age_ms / 1000
                ));
                item.updated_at = now_iso();
                recovered += 1;
            }
        }
        recovered
    }

    pub fn update_runner_heartbeat(
        &mut self,
        namespace: &Namespace,
        runner_id: &RunnerId,
        project_root: String,
    ) {
        let key = scoped_name(namespace.as_ref(), runner_id.as_str());
        let now = now_iso();
        let now_ms = crate::util::iso_to_ms(&now);
        self.runners
            .entry(key)
            .and_modify(|r| {
                r.last_heartbeat = now.clone();
                r.last_heartbeat_ms = now_ms;
                r.status = RunnerStatus::Running;
                r.project_root = project_root.clone();
            })
            .or_insert_with(|| RunnerRecord {
                namespace: namespace.clone(),
                runner_id: runner_id.clone(),
                project_root,
                status: RunnerStatus::Running,
                started_at: now.clone(),
                last_heartbeat: now,
                last_heartbeat_ms: now_ms,
            });
    }

    pub fn get_runner(&self, namespace: &Namespace, runner_id: &RunnerId) -> Option<RunnerRecord> {
        let key = scoped_name(namespace.as_ref(), runner_id.as_str());
        self.runners.get(&key).cloned()
    }

    pub fn get_all_runners(&self, namespace: &Namespace) -> Vec<RunnerRecord> {
        self.runners
            .iter()
            .filter(|(k, _)| belongs_to(k, namespace.as_ref()))
            .map(|(_, v)| v.clone())
            .collect()
    }

    pub fn get_runners_with_status(
        &self,
        namespace: &Namespace,
        heartbeat_timeout_ms: Option<i64>,
    ) -> Vec<RunnerWithStatus> {
        let timeout = heartbeat_timeout_ms.unwrap_or(tq_core::runner::DEFAULT_HEARTBEAT_TIMEOUT_MS);
        let now_ms = crate::util::iso_to_ms(&now_iso());
        self.get_all_runners(namespace)
            .into_iter()
            .map(|record| {
                let is_alive = record.is_alive(now_ms, timeout);
                RunnerWithStatus { record, is_alive }
            })
            .collect()
    }

    pub fn mark_runner_stopped(&mut self, namespace: &Namespace, runner_id: &RunnerId) {
        let key = scoped_name(namespace.as_ref(), runner_id.as_str());
        if let Some(r) = self.runners.get_mut(&key) {
            r.status = RunnerStatus::Stopped;
        }
    }

    pub fn delete_runner(&mut self, namespace: &Namespace, runner_id: &RunnerId) {
        let key = scoped_name(namespace.as_ref(), runner_id.as_str());
        self.runners.remove(&key);
    }
}

fn belongs_to(scoped_key: &str, namespace: &str) -> bool {
    split_scoped_name(scoped_key).0 == namespace
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
