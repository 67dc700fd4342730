//! Two-pass import executor
//!
//! Pass 1 creates every parent row (no parent-task cell) and records the id
//! returned for its title. Pass 2 creates child rows, linking each one to
//! the id registered for its parent-task cell. Calls are issued one at a
//! time and failures are collected per row.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use crate::api::models::NewTask;

use super::assignees::AssigneeDirectory;
use super::coerce::{coerce_date, coerce_priority, coerce_status};
use super::mapping::{FieldMapping, TaskField};
use super::value::SpreadsheetRow;

/// Destination for created tasks
#[async_trait]
pub trait TaskCreator: Send + Sync {
    /// Create a task in a project and return its id
    async fn create_task(&self, project_id: i64, task: &NewTask) -> Result<i64>;
}

/// Outcome of one import run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// Tasks created, across both passes
    pub succeeded: usize,
    /// Row-tagged failure messages in the order they happened
    pub errors: Vec<String>,
}

impl ImportResult {
    pub fn failed(&self) -> usize {
        self.errors.len()
    }
}

/// Title -> id table built during pass 1
#[derive(Debug, Default)]
pub struct ParentIndex {
    ids: HashMap<String, i64>,
}

impl ParentIndex {
    fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Register a created parent. Returns false (and keeps the existing id)
    /// when the title is already registered.
    pub fn register(&mut self, title: &str, id: i64) -> bool {
        match self.ids.entry(Self::key(title)) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(id);
                true
            }
        }
    }

    pub fn resolve(&self, name: &str) -> Option<i64> {
        self.ids.get(&Self::key(name)).copied()
    }
}

/// Sheet row number of a data row. Rows built in memory have no source
/// row and count from row 2 (row 1 is the header).
fn row_number(index: usize, row: &SpreadsheetRow) -> usize {
    row.sheet_row().unwrap_or(index + 2)
}

fn row_title(row: &SpreadsheetRow, mapping: &FieldMapping) -> Option<String> {
    mapping
        .cell(row, TaskField::Title)
        .and_then(|cell| cell.trimmed_text())
}

fn parent_name(row: &SpreadsheetRow, mapping: &FieldMapping) -> Option<String> {
    mapping
        .cell(row, TaskField::ParentTask)
        .and_then(|cell| cell.trimmed_text())
}

/// Build the task payload for a row.
///
/// Returns None when the title is empty. Unmapped optional fields keep
/// their defaults; the parent id is filled in by the caller.
pub fn build_task(
    row: &SpreadsheetRow,
    mapping: &FieldMapping,
    assignees: Option<&AssigneeDirectory>,
) -> Option<NewTask> {
    let mut task = NewTask::new(row_title(row, mapping)?);

    task.description = mapping
        .cell(row, TaskField::Description)
        .and_then(|cell| cell.trimmed_text());
    task.start_date = mapping.cell(row, TaskField::StartDate).and_then(coerce_date);
    task.end_date = mapping.cell(row, TaskField::EndDate).and_then(coerce_date);
    task.status = mapping
        .cell(row, TaskField::Status)
        .map(coerce_status)
        .unwrap_or_default();
    task.priority = mapping
        .cell(row, TaskField::Priority)
        .map(coerce_priority)
        .unwrap_or_default();

    if let (Some(directory), Some(name)) = (
        assignees,
        mapping
            .cell(row, TaskField::Assignee)
            .and_then(|cell| cell.trimmed_text()),
    ) {
        task.assignee_id = directory.resolve(&name);
        if task.assignee_id.is_none() {
            log::warn!("No user matches assignee '{}' (task '{}')", name, task.title);
        }
    }

    Some(task)
}

/// Run the two-pass import.
///
/// Returns None without touching `creator` when the title field is unmapped.
pub async fn run_import(
    creator: &dyn TaskCreator,
    project_id: i64,
    rows: &[SpreadsheetRow],
    mapping: &FieldMapping,
    assignees: Option<&AssigneeDirectory>,
) -> Option<ImportResult> {
    if !mapping.is_ready() {
        log::warn!("Import blocked: title column is not mapped");
        return None;
    }

    let mut result = ImportResult::default();
    let mut parents = ParentIndex::default();

    log::info!("Pass 1: creating parent tasks in project {}", project_id);
    for (index, row) in rows.iter().enumerate() {
        if row_title(row, mapping).is_none() || parent_name(row, mapping).is_some() {
            continue;
        }
        let Some(task) = build_task(row, mapping, assignees) else {
            continue;
        };

        match creator.create_task(project_id, &task).await {
            Ok(id) => {
                log::debug!(
                    "Row {}: created '{}' as #{}",
                    row_number(index, row),
                    task.title,
                    id
                );
                if !parents.register(&task.title, id) {
                    log::warn!(
                        "Row {}: duplicate parent title '{}', subtasks link to the first one",
                        row_number(index, row),
                        task.title
                    );
                }
                result.succeeded += 1;
            }
            Err(e) => {
                log::warn!("Row {}: create failed: {:#}", row_number(index, row), e);
                result
                    .errors
                    .push(format!("Row {}: {:#}", row_number(index, row), e));
            }
        }
    }

    log::info!("Pass 2: creating subtasks");
    for (index, row) in rows.iter().enumerate() {
        let Some(parent) = parent_name(row, mapping) else {
            continue;
        };
        let Some(mut task) = build_task(row, mapping, assignees) else {
            continue;
        };

        task.parent_task_id = parents.resolve(&parent);
        if task.parent_task_id.is_none() {
            log::info!(
                "Row {}: parent '{}' was not created, importing '{}' without a parent",
                row_number(index, row),
                parent,
                task.title
            );
        }

        match creator.create_task(project_id, &task).await {
            Ok(id) => {
                log::debug!(
                    "Row {}: created subtask '{}' as #{}",
                    row_number(index, row),
                    task.title,
                    id
                );
                result.succeeded += 1;
            }
            Err(e) => {
                log::warn!("Row {}: create subtask failed: {:#}", row_number(index, row), e);
                result
                    .errors
                    .push(format!("Row {} (subtarea): {:#}", row_number(index, row), e));
            }
        }
    }

    log::info!(
        "Import finished: {} created, {} failed",
        result.succeeded,
        result.failed()
    );
    Some(result)
}
