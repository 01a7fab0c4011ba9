// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sample() -> QueueItem {
    QueueItem {
        namespace: Namespace::new("acme"),
        task_id: TaskId::new("t-1"),
        task_group_id: TaskGroupId::new("g-1"),
        session_id: SessionId::new("s-1"),
        status: Status::Queued,
        prompt: "do the thing".into(),
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

#[test]
fn push_event_caps_at_max_events() {
    let mut item = sample();
    for i in 0..(MAX_EVENTS + 10) {
        item.push_event(ProgressEvent {
            kind: "tick".into(),
            message: Some(i.to_string()),
            timestamp: "2026-01-01T00:00:00Z".into(),
        });
    }
    let events = item.events.expect("events present");
    assert_eq!(events.len(), MAX_EVENTS);
    // oldest 10 were dropped; the earliest remaining message is "10"
    assert_eq!(events[0].message.as_deref(), Some("10"));
}

#[test]
fn push_conversation_entry_appends_in_order() {
    let mut item = sample();
    item.push_conversation_entry(ConversationEntry {
        role: ConversationRole::User,
        content: "hi".into(),
        timestamp: "2026-01-01T00:00:01Z".into(),
    });
    item.push_conversation_entry(ConversationEntry {
        role: ConversationRole::Assistant,
        content: "hello".into(),
        timestamp: "2026-01-01T00:00:02Z".into(),
    });
    let history = item.conversation_history.expect("history present");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, ConversationRole::User);
    assert_eq!(history[1].role, ConversationRole::Assistant);
}
