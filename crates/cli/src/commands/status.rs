// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tq status [task_id]`

use anyhow::Result;
use clap::Args;

use tq_core::{resolve_namespace, Namespace, TaskId};
use tq_storage::{FileQueueStore, QueueStore};

use crate::env;

#[derive(Args)]
pub struct StatusArgs {
    /// Show one task by id; omit to list every task in the project namespace
    pub task_id: Option<String>,
}

pub async fn run(args: StatusArgs) -> Result<()> {
    let project_root = env::project_root();
    let namespace = Namespace::new(resolve_namespace(&project_root));
    let store = FileQueueStore::new(env::state_dir());
    store.ensure_table().await?;

    match args.task_id {
        Some(id) => {
            let task_id = TaskId::new(id);
            match store.get_item(&namespace, &task_id).await? {
                Some(item) => println!(
                    "{}  {:?}  group={}  updated={}",
                    item.task_id, item.status, item.task_group_id, item.updated_at
                ),
                None => println!("no such task: {}", task_id),
            }
        }
        None => {
            let items = store.get_all_items(&namespace).await?;
            if items.is_empty() {
                println!("no tasks in namespace {}", namespace);
                return Ok(());
            }
            for item in items {
                println!(
                    "{}  {:?}  group={}  updated={}",
                    item.task_id, item.status, item.task_group_id, item.updated_at
                );
            }
        }
    }

    Ok(())
}
