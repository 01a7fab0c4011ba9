// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn fake_executor_returns_queued_sequence_then_default() {
    let fake = FakeExecutor::with_sequence(
        ExecutorOutcome {
            success: true,
            output: "default".into(),
            error: None,
            execution_time_ms: 1,
        },
        vec![ExecutorOutcome {
            success: false,
            output: String::new(),
            error: Some("boom".into()),
            execution_time_ms: 1,
        }],
    );
    let req = ExecutorRequest {
        prompt: "p".into(),
        timeout_ms: 1000,
        max_retries: 0,
    };
    let first = fake.execute(req.clone()).await;
    assert!(!first.success);
    let second = fake.execute(req).await;
    assert_eq!(second.output, "default");
}

#[tokio::test]
async fn fake_executor_records_last_timeout_ms() {
    let fake = FakeExecutor::success("x");
    fake.execute(ExecutorRequest {
        prompt: "p".into(),
        timeout_ms: 120_000,
        max_retries: 0,
    })
    .await;
    assert_eq!(fake.last_timeout_ms(), Some(120_000));
}

#[tokio::test]
async fn fake_task_executor_asks_clarification_with_prefix() {
    let fake = FakeTaskExecutor::asks_clarification("which branch?");
    let item = test_item();
    let outcome = fake.execute(&item).await;
    assert_eq!(outcome.status, tq_core::Status::Error);
    assert_eq!(
        outcome.error_message.as_deref(),
        Some("AWAITING_CLARIFICATION:which branch?")
    );
}

fn test_item() -> QueueItem {
    QueueItem {
        namespace: tq_core::Namespace::new("acme"),
        task_id: tq_core::TaskId::new("t-1"),
        task_group_id: tq_core::TaskGroupId::new("g-1"),
        session_id: tq_core::SessionId::new("s-1"),
        status: tq_core::Status::Running,
        prompt: "do it".into(),
        created_at: "2026-01-01T00:00:00Z".into(),
        updated_at: "2026-01-01T00:00:00Z".into(),
        task_type: None,
        error_message: None,
        output: None,
        clarification: None,
        conversation_history: None,
        events: None,
    }
}
