// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn ns() -> Namespace {
    Namespace::new("acme")
}

#[test]
fn enqueue_rejects_duplicate_task_id() {
    let mut model = QueueModel::new();
    let tid = TaskId::new("t-1");
    model
        .enqueue(
            &ns(),
            SessionId::new("s"),
            TaskGroupId::new("g"),
            "p".into(),
            Some(tid.clone()),
            None,
        )
        .unwrap();
    let err = model
        .enqueue(
            &ns(),
            SessionId::new("s"),
            TaskGroupId::new("g"),
            "p".into(),
            Some(tid),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));
}

#[test]
fn claim_picks_oldest_queued_and_transitions() {
    let mut model = QueueModel::new();
    let first = model
        .enqueue(&ns(), SessionId::new("s"), TaskGroupId::new("g"), "a".into(), None, None)
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(2));
    model
        .enqueue(&ns(), SessionId::new("s"), TaskGroupId::new("g"), "b".into(), None, None)
        .unwrap();

    let claimed = model.claim(&ns());
    assert!(claimed.success);
    assert_eq!(claimed.item.unwrap().task_id, first.task_id);
}

#[test]
fn claim_on_empty_queue_returns_unsuccessful_without_error() {
    let mut model = QueueModel::new();
    let result = model.claim(&ns());
    assert!(!result.success);
    assert!(result.error.is_none());
}

#[test]
fn invalid_transition_preserves_old_status() {
    let mut model = QueueModel::new();
    let item = model
        .enqueue(&ns(), SessionId::new("s"), TaskGroupId::new("g"), "p".into(), None, None)
        .unwrap();
    model
        .update_status(&ns(), &item.task_id, Status::Complete, None, None)
        .unwrap();
    let result = model
        .update_status_with_validation(&ns(), &item.task_id, Status::Queued)
        .unwrap();
    assert!(!result.success);
    assert_eq!(result.old_status, Some(Status::Complete));
}

#[test]
fn namespace_isolation_holds_for_get_all_items() {
    let mut model = QueueModel::new();
    model
        .enqueue(&ns(), SessionId::new("s"), TaskGroupId::new("g"), "a".into(), None, None)
        .unwrap();
    model
        .enqueue(
            &Namespace::new("other"),
            SessionId::new("s"),
            TaskGroupId::new("g"),
            "b".into(),
            None,
            None,
        )
        .unwrap();
    let items = model.get_all_items(&ns());
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].prompt, "a");
}

#[test]
fn recover_stale_tasks_only_touches_old_running_tasks() {
    let mut model = QueueModel::new();
    let stale = model
        .enqueue(&ns(), SessionId::new("s"), TaskGroupId::new("g"), "stale".into(), None, None)
        .unwrap();
    let fresh = model
        .enqueue(&ns(), SessionId::new("s"), TaskGroupId::new("g"), "fresh".into(), None, None)
        .unwrap();
    model
        .update_status(&ns(), &stale.task_id, Status::Running, None, None)
        .unwrap();
    model
        .update_status(&ns(), &fresh.task_id, Status::Running, None, None)
        .unwrap();

    let key = scoped_name(ns().as_ref(), stale.task_id.as_str());
    model.tasks.get_mut(&key).unwrap().updated_at =
        crate::util::ms_to_iso(crate::util::iso_to_ms(&now_iso()) - 10 * 60_000);

    let recovered = model.recover_stale_tasks(&ns(), 300_000);
    assert_eq!(recovered, 1);
    assert_eq!(model.get_item(&ns(), &stale.task_id).unwrap().status, Status::Error);
    assert_eq!(model.get_item(&ns(), &fresh.task_id).unwrap().status, Status::Running);
}

#[test]
fn resume_with_response_appends_one_user_entry() {
    let mut model = QueueModel::new();
    let item = model
        .enqueue(&ns(), SessionId::new("s"), TaskGroupId::new("g"), "p".into(), None, None)
        .unwrap();
    model
        .update_status(&ns(), &item.task_id, Status::Running, None, None)
        .unwrap();
    model
        .set_awaiting_response(
            &ns(),
            &item.task_id,
            ClarificationRequest::from_poller_prefix("which env?", "ctx"),
            None,
            None,
        )
        .unwrap();
    let result = model
        .resume_with_response(&ns(), &item.task_id, "prod".to_string())
        .unwrap();
    assert!(result.success);
    assert_eq!(result.new_status, Some(Status::Queued));
    let updated = model.get_item(&ns(), &item.task_id).unwrap();
    assert_eq!(updated.conversation_history.unwrap().len(), 1);
}
