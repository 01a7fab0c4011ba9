// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clarification requests: the structured pause-and-ask interaction that
//! parks a task in `AWAITING_RESPONSE`.

use serde::{Deserialize, Serialize};

/// Coarse classification of why a clarification was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClarificationType {
    BestPractice,
    CaseByCase,
    Unknown,
}

/// A question raised by the executor mid-execution, and its eventual resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarificationRequest {
    #[serde(rename = "type")]
    pub kind: ClarificationType,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_resolved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_reasoning: Option<String>,
}

impl ClarificationRequest {
    /// Build a minimal clarification from the text following the
    /// `AWAITING_CLARIFICATION:` prefix recognized by the poller.
    pub fn from_poller_prefix(question: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            kind: ClarificationType::Unknown,
            question: question.into(),
            options: None,
            context: Some(context.into()),
            auto_resolved: None,
            resolution: None,
            resolution_reasoning: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some() || self.auto_resolved == Some(true)
    }
}

#[cfg(test)]
#[path = "clarification_tests.rs"]
mod tests;
