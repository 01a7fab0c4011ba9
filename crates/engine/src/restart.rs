// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RestartHandler`: scans non-terminal tasks at startup and applies the
//! action decided by [`crate::supervisor::detect_restart_state`].

use std::sync::Arc;

use tq_core::{Namespace, Status};
use tracing::{info, warn};

use crate::error::EngineError;
use crate::supervisor::{detect_restart_state, RestartActionKind, DEFAULT_STALE_THRESHOLD_MS};
use tq_storage::QueueStore;

pub type RestartAction = RestartActionKind;

#[derive(Debug, Clone)]
pub struct RestartDecision {
    pub task_id: tq_core::TaskId,
    pub action: RestartAction,
}

pub struct RestartHandler {
    store: Arc<dyn QueueStore>,
    stale_threshold_ms: i64,
}

impl RestartHandler {
    pub fn new(store: Arc<dyn QueueStore>) -> Self {
        Self {
            store,
            stale_threshold_ms: DEFAULT_STALE_THRESHOLD_MS,
        }
    }

    pub fn with_stale_threshold_ms(mut self, ms: i64) -> Self {
        self.stale_threshold_ms = ms;
        self
    }

    /// Scan every `RUNNING`/`AWAITING_RESPONSE` task in `namespace`, decide
    /// its restart action, and apply `rollback_replay` transitions.
    /// `continue`/`resume` require no state change here.
    pub async fn scan_and_recover(&self, namespace: &Namespace, now_ms: i64) -> Result<Vec<RestartDecision>, EngineError> {
        let mut decisions = Vec::new();

        let mut candidates = self.store.get_by_status(namespace, Status::Running).await?;
        candidates.extend(self.store.get_by_status(namespace, Status::AwaitingResponse).await?);

        for item in candidates {
            let last_progress_ms = tq_storage_iso_to_ms(&item.updated_at);
            let has_artifacts = item.output.is_some();
            let action = detect_restart_state(
                item.status,
                now_ms,
                last_progress_ms,
                has_artifacts,
                self.stale_threshold_ms,
            );

            match action {
                RestartActionKind::RollbackReplay => {
                    warn!(task_id = %item.task_id, "stale task detected, marking ERROR for re-queue");
                    self.store
                        .update_status(
                            namespace,
                            &item.task_id,
                            Status::Error,
                            Some(format!(
                                "Stale task detected: running for {}ms without progress. Needs re-queue.",
                                now_ms - last_progress_ms
                            )),
                            None,
                        )
                        .await?;
                }
                RestartActionKind::Resume | RestartActionKind::Continue => {
                    info!(task_id = %item.task_id, action = ?action, "task will be picked up by the runner");
                }
                RestartActionKind::None => {}
            }

            decisions.push(RestartDecision {
                task_id: item.task_id,
                action,
            });
        }

        Ok(decisions)
    }
}

/// Local copy of the ISO-8601-to-epoch-ms conversion so this crate does not
/// need to depend on `tq-storage`'s internal `util` module.
fn tq_storage_iso_to_ms(iso: &str) -> i64 {
    chrono::DateTime::parse_from_rfc3339(iso)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "restart_tests.rs"]
mod tests;
