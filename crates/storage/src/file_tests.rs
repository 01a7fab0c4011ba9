// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

fn ns() -> Namespace {
    Namespace::new("acme")
}

#[tokio::test]
async fn persists_across_reopen() {
    let dir = tempdir().unwrap();
    let store = FileQueueStore::new(dir.path());
    store.ensure_table().await.unwrap();
    let item = store
        .enqueue(&ns(), SessionId::new("s"), TaskGroupId::new("g"), "p".into(), None, None)
        .await
        .unwrap();

    let reopened = FileQueueStore::new(dir.path());
    let fetched = reopened.get_item(&ns(), &item.task_id).await.unwrap();
    assert!(fetched.is_some());
}

#[tokio::test]
async fn preserves_foreign_namespace_entries_on_write() {
    let dir = tempdir().unwrap();
    let store = FileQueueStore::new(dir.path());
    store.ensure_table().await.unwrap();
    store
        .enqueue(
            &Namespace::new("other"),
            SessionId::new("s"),
            TaskGroupId::new("g"),
            "foreign".into(),
            None,
            None,
        )
        .await
        .unwrap();

    let reopened = FileQueueStore::new(dir.path());
    reopened
        .enqueue(&ns(), SessionId::new("s"), TaskGroupId::new("g"), "mine".into(), None, None)
        .await
        .unwrap();

    let all_other = reopened.get_all_items(&Namespace::new("other")).await.unwrap();
    assert_eq!(all_other.len(), 1);
    assert_eq!(all_other[0].prompt, "foreign");
}

#[tokio::test]
async fn writes_tasks_and_runners_as_sibling_documents() {
    let dir = tempdir().unwrap();
    let store = FileQueueStore::new(dir.path());
    store.ensure_table().await.unwrap();
    store
        .enqueue(&ns(), SessionId::new("s"), TaskGroupId::new("g"), "p".into(), None, None)
        .await
        .unwrap();
    store
        .update_runner_heartbeat(&ns(), &RunnerId::new("r-1"), "/srv/proj".to_string())
        .await
        .unwrap();

    assert!(tasks_file_path(dir.path()).exists());
    assert!(runners_file_path(dir.path()).exists());

    let tasks_content = std::fs::read_to_string(tasks_file_path(dir.path())).unwrap();
    let tasks_doc: serde_json::Value = serde_json::from_str(&tasks_content).unwrap();
    assert_eq!(tasks_doc["version"], 1);
    assert!(!tasks_doc["tasks"].as_object().unwrap().contains_key("acme:r-1"));
    assert_eq!(tasks_doc["runners"], serde_json::json!({}));
    assert!(tasks_doc["last_modified"].is_string());

    let runners_content = std::fs::read_to_string(runners_file_path(dir.path())).unwrap();
    let runners_doc: serde_json::Value = serde_json::from_str(&runners_content).unwrap();
    assert!(runners_doc.as_object().unwrap().contains_key("acme:r-1"));
}

#[test]
fn tasks_file_path_is_under_queue_subdir() {
    let base = Path::new("/srv/proj");
    assert_eq!(tasks_file_path(base), base.join("queue").join("tasks.json"));
}

#[test]
fn runners_file_path_is_under_queue_subdir() {
    let base = Path::new("/srv/proj");
    assert_eq!(runners_file_path(base), base.join("queue").join("runners.json"));
}
