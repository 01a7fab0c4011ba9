// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn ok_inputs() -> PreflightInputs {
    PreflightInputs {
        command: "node server.js".to_string(),
        web_port: 4000,
        state_dir_writable: true,
    }
}

#[test]
fn passes_with_valid_inputs() {
    let report = run_preflight(&ok_inputs());
    assert!(report.passable());
    assert!(report.first_fatal().is_none());
}

#[test]
fn empty_command_is_fatal() {
    let mut inputs = ok_inputs();
    inputs.command = "  ".to_string();
    let report = run_preflight(&inputs);
    assert!(!report.passable());
    assert_eq!(report.first_fatal().unwrap().code, "empty_command");
}

#[test]
fn zero_port_is_fatal() {
    let mut inputs = ok_inputs();
    inputs.web_port = 0;
    let report = run_preflight(&inputs);
    assert!(!report.passable());
}

#[test]
fn unwritable_state_dir_is_fatal() {
    let mut inputs = ok_inputs();
    inputs.state_dir_writable = false;
    let report = run_preflight(&inputs);
    assert!(!report.passable());
    assert_eq!(report.first_fatal().unwrap().code, "state_dir_not_writable");
}
