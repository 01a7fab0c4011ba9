// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `HttpExecutor`: drives the composed-prompt [`Executor`] contract against
//! an HTTP endpoint (the companion server managed by [`crate::ProcessSupervisor`]
//! or an external model API). One POST per attempt; the supervisor owns retry.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tq_engine::{Executor, ExecutorOutcome, ExecutorRequest};
use tracing::warn;

#[derive(Debug, Serialize)]
struct ExecuteBody<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    output: String,
}

pub struct HttpExecutor {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpExecutor {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Executor for HttpExecutor {
    async fn execute(&self, request: ExecutorRequest) -> ExecutorOutcome {
        let started = Instant::now();
        let result = self
            .client
            .post(&self.endpoint)
            .timeout(Duration::from_millis(request.timeout_ms))
            .json(&ExecuteBody {
                prompt: &request.prompt,
            })
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                match response.json::<ExecuteResponse>().await {
                    Ok(body) => ExecutorOutcome {
                        success: true,
                        output: body.output,
                        error: None,
                        execution_time_ms: started.elapsed().as_millis() as u64,
                    },
                    Err(e) => ExecutorOutcome {
                        success: false,
                        output: String::new(),
                        error: Some(format!("malformed response body: {}", e)),
                        execution_time_ms: started.elapsed().as_millis() as u64,
                    },
                }
            }
            Ok(response) => ExecutorOutcome {
                success: false,
                output: String::new(),
                error: Some(format!("non-200 response: {}", response.status())),
                execution_time_ms: started.elapsed().as_millis() as u64,
            },
            Err(e) => {
                warn!(error = %e, "executor request failed");
                ExecutorOutcome {
                    success: false,
                    output: String::new(),
                    error: Some(e.to_string()),
                    execution_time_ms: started.elapsed().as_millis() as u64,
                }
            }
        }
    }
}
