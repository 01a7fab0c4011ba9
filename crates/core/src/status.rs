// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task status and its transition table.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a [`crate::QueueItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Queued,
    Running,
    AwaitingResponse,
    Complete,
    Error,
    Cancelled,
}

impl Status {
    /// True once a task can never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Complete | Status::Error | Status::Cancelled)
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(self, next: Status) -> bool {
        use Status::*;
        matches!(
            (self, next),
            (Queued, Running)
                | (Queued, Cancelled)
                | (Running, Complete)
                | (Running, Error)
                | (Running, AwaitingResponse)
                | (Running, Cancelled)
                | (AwaitingResponse, Queued)
                | (AwaitingResponse, Cancelled)
        )
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Queued => "QUEUED",
            Status::Running => "RUNNING",
            Status::AwaitingResponse => "AWAITING_RESPONSE",
            Status::Complete => "COMPLETE",
            Status::Error => "ERROR",
            Status::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
