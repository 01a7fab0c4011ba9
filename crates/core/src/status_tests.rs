// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use Status::*;

#[test]
fn terminal_states_have_no_outgoing_transitions() {
    for terminal in [Complete, Error, Cancelled] {
        for next in [Queued, Running, AwaitingResponse, Complete, Error, Cancelled] {
            assert!(!terminal.can_transition_to(next), "{terminal:?} -> {next:?}");
        }
    }
}

#[test]
fn queued_can_only_go_running_or_cancelled() {
    assert!(Queued.can_transition_to(Running));
    assert!(Queued.can_transition_to(Cancelled));
    assert!(!Queued.can_transition_to(Complete));
    assert!(!Queued.can_transition_to(AwaitingResponse));
}

#[test]
fn running_reaches_all_four_successors() {
    assert!(Running.can_transition_to(Complete));
    assert!(Running.can_transition_to(Error));
    assert!(Running.can_transition_to(AwaitingResponse));
    assert!(Running.can_transition_to(Cancelled));
    assert!(!Running.can_transition_to(Queued));
}

#[test]
fn awaiting_response_resumes_to_queued() {
    assert!(AwaitingResponse.can_transition_to(Queued));
    assert!(AwaitingResponse.can_transition_to(Cancelled));
    assert!(!AwaitingResponse.can_transition_to(Running));
    assert!(!AwaitingResponse.can_transition_to(Complete));
}

#[test]
fn complete_is_terminal() {
    assert!(Complete.is_terminal());
    assert!(Error.is_terminal());
    assert!(Cancelled.is_terminal());
    assert!(!Running.is_terminal());
    assert!(!Queued.is_terminal());
    assert!(!AwaitingResponse.is_terminal());
}

#[test]
fn display_matches_screaming_snake_case() {
    assert_eq!(AwaitingResponse.to_string(), "AWAITING_RESPONSE");
}
