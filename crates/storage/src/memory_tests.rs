// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Arc;

fn ns() -> Namespace {
    Namespace::new("acme")
}

#[tokio::test]
async fn enqueue_then_get_item_round_trips() {
    let store = InMemoryQueueStore::new();
    let item = store
        .enqueue(&ns(), SessionId::new("s"), TaskGroupId::new("g"), "hi".into(), None, None)
        .await
        .unwrap();
    let fetched = store.get_item(&ns(), &item.task_id).await.unwrap().unwrap();
    assert_eq!(fetched.prompt, "hi");
    assert_eq!(fetched.status, Status::Queued);
}

#[tokio::test]
async fn concurrent_claims_yield_exactly_one_winner() {
    let store = Arc::new(InMemoryQueueStore::new());
    store
        .enqueue(&ns(), SessionId::new("s"), TaskGroupId::new("g"), "only".into(), None, None)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move { store.claim(&ns()).await.unwrap() }));
    }
    let mut successes = 0;
    for h in handles {
        if h.await.unwrap().success {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test]
async fn ensure_table_is_idempotent() {
    let store = InMemoryQueueStore::new();
    store.ensure_table().await.unwrap();
    store.ensure_table().await.unwrap();
}
