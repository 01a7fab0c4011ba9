// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tq enqueue <prompt>`

use anyhow::Result;
use clap::Args;

use tq_core::{resolve_namespace, Namespace, SessionId, TaskGroupId};
use tq_storage::{FileQueueStore, QueueStore};

use crate::env;

#[derive(Args)]
pub struct EnqueueArgs {
    /// Prompt text to queue
    pub prompt: String,
    /// Task group to attach this task to (defaults to a fresh one)
    #[arg(long)]
    pub group: Option<String>,
}

pub async fn run(args: EnqueueArgs) -> Result<()> {
    let project_root = env::project_root();
    let namespace = Namespace::new(resolve_namespace(&project_root));
    let store = FileQueueStore::new(env::state_dir());
    store.ensure_table().await?;

    let task_group_id = args
        .group
        .map(TaskGroupId::new)
        .unwrap_or_else(|| TaskGroupId::new(uuid::Uuid::new_v4().to_string()));

    let item = store
        .enqueue(
            &namespace,
            SessionId::new(uuid::Uuid::new_v4().to_string()),
            task_group_id,
            args.prompt,
            None,
            None,
        )
        .await?;

    println!("queued task {} in group {}", item.task_id, item.task_group_id);
    Ok(())
}
