//! Data models for the task API
//!
//! Field names on the wire follow the API's Spanish schema (`titulo`,
//! `fecha_inicio`, ...); the Rust side uses English names.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "sin_iniciar")]
    NotStarted,
    #[serde(rename = "en_progreso")]
    InProgress,
    #[serde(rename = "en_espera")]
    OnHold,
    #[serde(rename = "aplazado")]
    Deferred,
    #[serde(rename = "terminado")]
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::OnHold,
        TaskStatus::Deferred,
        TaskStatus::Done,
    ];

    /// Get display label
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not-started",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::OnHold => "on-hold",
            TaskStatus::Deferred => "deferred",
            TaskStatus::Done => "done",
        }
    }

    /// Value sent to the API
    pub fn wire_value(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "sin_iniciar",
            TaskStatus::InProgress => "en_progreso",
            TaskStatus::OnHold => "en_espera",
            TaskStatus::Deferred => "aplazado",
            TaskStatus::Done => "terminado",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskPriority {
    #[serde(rename = "urgente")]
    Urgent,
    #[serde(rename = "alta")]
    High,
    #[default]
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "baja")]
    Low,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 4] = [
        TaskPriority::Urgent,
        TaskPriority::High,
        TaskPriority::Medium,
        TaskPriority::Low,
    ];

    /// Get display label
    pub fn label(&self) -> &'static str {
        match self {
            TaskPriority::Urgent => "urgent",
            TaskPriority::High => "high",
            TaskPriority::Medium => "medium",
            TaskPriority::Low => "low",
        }
    }

    /// Value sent to the API
    pub fn wire_value(&self) -> &'static str {
        match self {
            TaskPriority::Urgent => "urgente",
            TaskPriority::High => "alta",
            TaskPriority::Medium => "media",
            TaskPriority::Low => "baja",
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Payload for creating a task in a project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "fecha_inicio", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "fecha_fin", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "estado")]
    pub status: TaskStatus,
    #[serde(rename = "prioridad")]
    pub priority: TaskPriority,
    #[serde(rename = "tarea_padre_id", skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<i64>,
    #[serde(rename = "responsable_id", skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<i64>,
}

impl NewTask {
    /// Create a task with default status and priority
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            start_date: None,
            end_date: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            parent_task_id: None,
            assignee_id: None,
        }
    }
}

/// Response to a successful create call
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// Error body returned by the API on non-2xx responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Project as returned by `GET /api/proyectos/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "estado", default)]
    pub state: Option<String>,
    #[serde(rename = "total_tareas", default)]
    pub total_tasks: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProjectEnvelope {
    #[serde(rename = "proyecto")]
    pub project: Project,
}

/// User as returned by `GET /api/usuarios`
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "activo", default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UsersEnvelope {
    #[serde(rename = "usuarios")]
    pub users: Vec<User>,
}
