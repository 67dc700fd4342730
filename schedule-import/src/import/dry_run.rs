//! In-memory task creator for `--dry-run`

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::api::models::NewTask;

use super::executor::TaskCreator;

/// Assigns sequential ids and keeps every payload instead of calling the API
#[derive(Debug)]
pub struct DryRunCreator {
    next_id: AtomicI64,
    created: Mutex<Vec<(i64, NewTask)>>,
}

impl Default for DryRunCreator {
    fn default() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            created: Mutex::new(Vec::new()),
        }
    }
}

impl DryRunCreator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads in creation order, with the ids they were given
    pub fn into_created(self) -> Vec<(i64, NewTask)> {
        self.created
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TaskCreator for DryRunCreator {
    async fn create_task(&self, project_id: i64, task: &NewTask) -> Result<i64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        log::debug!("[dry-run] project {}: #{} '{}'", project_id, id, task.title);

        self.created
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((id, task.clone()));
        Ok(id)
    }
}
