// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::executor::FakeTaskExecutor;
use tq_core::{SessionId, TaskGroupId};
use tq_storage::InMemoryQueueStore;

fn config() -> PollerConfig {
    PollerConfig::new(Namespace::new("acme"), "/srv/acme")
}

#[tokio::test]
async fn poll_with_no_tasks_emits_no_task() {
    let store: Arc<dyn QueueStore> = Arc::new(InMemoryQueueStore::new());
    let executor: Arc<dyn TaskExecutor> = Arc::new(FakeTaskExecutor::completes_with("x"));
    let poller = Arc::new(Poller::new(config(), store, executor));
    let mut events = poller.subscribe();
    poller.poll().await;
    let event = events.recv().await.unwrap();
    assert!(matches!(event, PollerEvent::NoTask));
}

#[tokio::test]
async fn poll_claims_and_completes_a_task() {
    let store = Arc::new(InMemoryQueueStore::new());
    let ns = Namespace::new("acme");
    store
        .enqueue(&ns, SessionId::new("s"), TaskGroupId::new("g"), "p".into(), None, None)
        .await
        .unwrap();
    let executor: Arc<dyn TaskExecutor> = Arc::new(FakeTaskExecutor::completes_with("done"));
    let store_dyn: Arc<dyn QueueStore> = store.clone();
    let poller = Arc::new(Poller::new(config(), store_dyn, executor));
    poller.poll().await;

    let items = store.get_by_status(&ns, Status::Complete).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].output.as_deref(), Some("done"));
}

#[tokio::test]
async fn clarification_prefix_parks_task_awaiting_response() {
    let store = Arc::new(InMemoryQueueStore::new());
    let ns = Namespace::new("acme");
    store
        .enqueue(&ns, SessionId::new("s"), TaskGroupId::new("g"), "p".into(), None, None)
        .await
        .unwrap();
    let executor: Arc<dyn TaskExecutor> = Arc::new(FakeTaskExecutor::asks_clarification("which env?"));
    let store_dyn: Arc<dyn QueueStore> = store.clone();
    let poller = Arc::new(Poller::new(config(), store_dyn, executor));
    poller.poll().await;

    let items = store.get_by_status(&ns, Status::AwaitingResponse).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].clarification.as_ref().unwrap().question,
        "which env?"
    );
}

#[tokio::test]
async fn in_flight_limit_is_one_per_poller() {
    let store = Arc::new(InMemoryQueueStore::new());
    let ns = Namespace::new("acme");
    store
        .enqueue(&ns, SessionId::new("s"), TaskGroupId::new("g"), "a".into(), None, None)
        .await
        .unwrap();
    store
        .enqueue(&ns, SessionId::new("s"), TaskGroupId::new("g"), "b".into(), None, None)
        .await
        .unwrap();
    let executor: Arc<dyn TaskExecutor> = Arc::new(FakeTaskExecutor::completes_with("done"));
    let store_dyn: Arc<dyn QueueStore> = store.clone();
    let poller = Poller::new(config(), store_dyn, executor);
    *poller.in_flight.lock() = Some(tq_core::TaskId::new("already-running"));
    poller.poll().await;

    let still_queued = store.get_by_status(&ns, Status::Queued).await.unwrap();
    assert_eq!(still_queued.len(), 2, "poll should not claim while in-flight is set");
}
