// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Poller`: the single-in-flight timed claim loop for one runner identity.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use tq_core::id::RandomRunnerSuffix;
use tq_core::{ClarificationRequest, Namespace, RunnerId, Status};
use tq_storage::QueueStore;

use crate::error::EngineError;
use crate::executor::TaskExecutor;

const CLARIFICATION_PREFIX: &str = "AWAITING_CLARIFICATION:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Stopped,
    Running,
    Stopping,
}

/// Configuration for one poller instance.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub namespace: Namespace,
    pub runner_id: RunnerId,
    pub project_root: String,
    pub poll_interval_ms: u64,
    pub max_stale_task_age_ms: i64,
    pub recover_on_startup: bool,
}

impl PollerConfig {
    pub fn new(namespace: Namespace, project_root: impl Into<String>) -> Self {
        let runner_id = RunnerId::new(RandomRunnerSuffix.generate(epoch_ms()));
        Self {
            namespace,
            runner_id,
            project_root: project_root.into(),
            poll_interval_ms: 1000,
            max_stale_task_age_ms: 300_000,
            recover_on_startup: true,
        }
    }
}

fn epoch_ms() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Events emitted by the poller for observability. Subscribers register via
/// [`Poller::subscribe`] and receive an owned receiver; there is no shared
/// bus to unsubscribe from beyond dropping the receiver.
#[derive(Debug, Clone)]
pub enum PollerEvent {
    Started,
    Stopped,
    Poll { queued_count: usize },
    Claimed { task_id: tq_core::TaskId },
    Completed { task_id: tq_core::TaskId },
    Error { task_id: tq_core::TaskId, message: String },
    NoTask,
    AlreadyClaimed { reason: String },
    StaleRecovered { count: usize },
    ClarificationNeeded { task_id: tq_core::TaskId, message: String },
}

pub struct Poller {
    config: PollerConfig,
    store: Arc<dyn QueueStore>,
    executor: Arc<dyn TaskExecutor>,
    state: Arc<Mutex<PollerState>>,
    in_flight: Arc<Mutex<Option<tq_core::TaskId>>>,
    events_tx: mpsc::UnboundedSender<PollerEvent>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<PollerEvent>>>,
    shutdown: Arc<AtomicBool>,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Poller {
    pub fn new(config: PollerConfig, store: Arc<dyn QueueStore>, executor: Arc<dyn TaskExecutor>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            config,
            store,
            executor,
            state: Arc::new(Mutex::new(PollerState::Stopped)),
            in_flight: Arc::new(Mutex::new(None)),
            events_tx: tx,
            events_rx: Mutex::new(Some(rx)),
            shutdown: Arc::new(AtomicBool::new(false)),
            loop_handle: Mutex::new(None),
        }
    }

    pub fn state(&self) -> PollerState {
        *self.state.lock()
    }

    /// Subscribe to poller events. Only one subscriber is supported at a
    /// time (mirrors the observer-with-unsubscribe-handle shape: dropping
    /// the returned receiver is the unsubscribe).
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<PollerEvent> {
        self.events_rx
            .lock()
            .take()
            .expect("poller events can only be subscribed to once")
    }

    fn emit(&self, event: PollerEvent) {
        let _ = self.events_tx.send(event);
    }

    /// Runs the startup sequence (optionally recovering stale tasks) and
    /// begins the periodic poll loop on a background task.
    pub async fn start(self: &Arc<Self>) -> Result<(), EngineError> {
        *self.state.lock() = PollerState::Running;
        self.shutdown.store(false, Ordering::SeqCst);

        if self.config.recover_on_startup {
            match self
                .store
                .recover_stale_tasks(&self.config.namespace, self.config.max_stale_task_age_ms)
                .await
            {
                Ok(count) => {
                    self.emit(PollerEvent::StaleRecovered { count });
                }
                Err(e) => warn!(error = %e, "stale recovery on startup failed"),
            }
        }

        self.emit(PollerEvent::Started);
        info!(runner_id = %self.config.runner_id, "poller started");

        self.poll().await;

        let this = Arc::clone(self);
        let interval_ms = self.config.poll_interval_ms;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_millis(interval_ms));
            ticker.tick().await; // first tick fires immediately; already polled above
            loop {
                ticker.tick().await;
                if this.shutdown.load(Ordering::SeqCst) {
                    break;
                }
                this.poll().await;
            }
        });
        *self.loop_handle.lock() = Some(handle);

        Ok(())
    }

    /// One iteration: heartbeat, then claim-and-execute if nothing is
    /// in-flight.
    pub async fn poll(&self) {
        if let Err(e) = self
            .store
            .update_runner_heartbeat(
                &self.config.namespace,
                &self.config.runner_id,
                self.config.project_root.clone(),
            )
            .await
        {
            warn!(error = %e, "heartbeat update failed");
        }

        if self.in_flight.lock().is_some() {
            return;
        }

        let claim = match self.store.claim(&self.config.namespace).await {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, "claim failed");
                return;
            }
        };

        let Some(item) = claim.item else {
            if let Some(reason) = claim.error {
                self.emit(PollerEvent::AlreadyClaimed { reason });
            } else {
                self.emit(PollerEvent::NoTask);
            }
            return;
        };

        *self.in_flight.lock() = Some(item.task_id.clone());
        self.emit(PollerEvent::Claimed {
            task_id: item.task_id.clone(),
        });

        self.execute_claimed(item).await;
        *self.in_flight.lock() = None;
    }

    async fn execute_claimed(&self, item: tq_core::QueueItem) {
        let task_id = item.task_id.clone();
        let outcome = self.executor.execute(&item).await;

        if outcome.status == Status::Error {
            if let Some(message) = outcome.error_message.as_deref() {
                if let Some(question) = message.strip_prefix(CLARIFICATION_PREFIX) {
                    let clarification = ClarificationRequest::from_poller_prefix(
                        question.to_string(),
                        item.prompt.clone(),
                    );
                    match self
                        .store
                        .set_awaiting_response(
                            &self.config.namespace,
                            &task_id,
                            clarification,
                            None,
                            outcome.output.clone(),
                        )
                        .await
                    {
                        Ok(_) => {
                            self.emit(PollerEvent::ClarificationNeeded {
                                task_id,
                                message: question.to_string(),
                            });
                        }
                        Err(e) => error!(error = %e, "failed to record clarification request"),
                    }
                    return;
                }
            }
        }

        let update_result = self
            .store
            .update_status(
                &self.config.namespace,
                &task_id,
                outcome.status,
                outcome.error_message.clone(),
                outcome.output,
            )
            .await;

        match update_result {
            Ok(()) => match outcome.status {
                Status::Complete => self.emit(PollerEvent::Completed { task_id }),
                _ => self.emit(PollerEvent::Error {
                    task_id,
                    message: outcome.error_message.unwrap_or_default(),
                }),
            },
            Err(e) => {
                warn!(error = %e, "failed to record execution outcome");
            }
        }
    }

    /// Idempotent. Stops the poll timer and marks the runner stopped.
    pub async fn stop(&self) {
        if *self.state.lock() == PollerState::Stopped {
            return;
        }
        *self.state.lock() = PollerState::Stopping;
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.loop_handle.lock().take() {
            handle.abort();
        }
        if let Err(e) = self
            .store
            .mark_runner_stopped(&self.config.namespace, &self.config.runner_id)
            .await
        {
            debug!(error = %e, "mark_runner_stopped failed during stop");
        }
        *self.state.lock() = PollerState::Stopped;
        self.emit(PollerEvent::Stopped);
    }
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
