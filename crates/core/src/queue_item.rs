// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The [`QueueItem`]: the unit of durable work tracked by the store.

use crate::{ClarificationRequest, Namespace, SessionId, Status, TaskGroupId, TaskId};
use serde::{Deserialize, Serialize};

/// Maximum number of progress events retained per task; beyond this, the
/// oldest entries are dropped (invariant I5).
pub const MAX_EVENTS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    ReadInfo,
    Implementation,
    Report,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub role: ConversationRole,
    pub content: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: String,
}

/// A single durable item in the task queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub namespace: Namespace,
    pub task_id: TaskId,
    pub task_group_id: TaskGroupId,
    pub session_id: SessionId,
    pub status: Status,
    pub prompt: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarification: Option<ClarificationRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_history: Option<Vec<ConversationEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<ProgressEvent>>,
}

impl QueueItem {
    /// Append a progress event, enforcing the [`MAX_EVENTS`] cap by dropping
    /// the oldest entries first.
    pub fn push_event(&mut self, event: ProgressEvent) {
        let events = self.events.get_or_insert_with(Vec::new);
        events.push(event);
        if events.len() > MAX_EVENTS {
            let overflow = events.len() - MAX_EVENTS;
            events.drain(0..overflow);
        }
    }

    /// Append a conversation entry. Only meaningful while the task is
    /// non-terminal (invariant I4); callers are responsible for the status
    /// check, this just performs the append.
    pub fn push_conversation_entry(&mut self, entry: ConversationEntry) {
        self.conversation_history
            .get_or_insert_with(Vec::new)
            .push(entry);
    }
}

#[cfg(test)]
#[path = "queue_item_tests.rs"]
mod tests;
