// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tq_core::{SessionId, TaskGroupId};
use tq_storage::InMemoryQueueStore;

#[tokio::test]
async fn rollback_replay_marks_stale_running_task_as_error() {
    let store: Arc<dyn QueueStore> = Arc::new(InMemoryQueueStore::new());
    let ns = Namespace::new("acme");
    let item = store
        .enqueue(&ns, SessionId::new("s"), TaskGroupId::new("g"), "p".into(), None, None)
        .await
        .unwrap();
    store
        .update_status(&ns, &item.task_id, Status::Running, None, None)
        .await
        .unwrap();

    let handler = RestartHandler::new(Arc::clone(&store)).with_stale_threshold_ms(1_000);
    let now_ms = tq_storage_iso_to_ms(&chrono::Utc::now().to_rfc3339()) + 60_000;
    let decisions = handler.scan_and_recover(&ns, now_ms).await.unwrap();

    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].action, RestartActionKind::RollbackReplay);
    let updated = store.get_item(&ns, &item.task_id).await.unwrap().unwrap();
    assert_eq!(updated.status, Status::Error);
}

#[tokio::test]
async fn awaiting_response_task_continues_without_mutation() {
    use tq_core::ClarificationRequest;
    let store: Arc<dyn QueueStore> = Arc::new(InMemoryQueueStore::new());
    let ns = Namespace::new("acme");
    let item = store
        .enqueue(&ns, SessionId::new("s"), TaskGroupId::new("g"), "p".into(), None, None)
        .await
        .unwrap();
    store
        .update_status(&ns, &item.task_id, Status::Running, None, None)
        .await
        .unwrap();
    store
        .set_awaiting_response(
            &ns,
            &item.task_id,
            ClarificationRequest::from_poller_prefix("q", "ctx"),
            None,
            None,
        )
        .await
        .unwrap();

    let handler = RestartHandler::new(Arc::clone(&store));
    let decisions = handler
        .scan_and_recover(&ns, tq_storage_iso_to_ms(&chrono::Utc::now().to_rfc3339()))
        .await
        .unwrap();
    assert_eq!(decisions[0].action, RestartActionKind::Continue);
    let unchanged = store.get_item(&ns, &item.task_id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, Status::AwaitingResponse);
}
