//! HTTP client for the task API

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::models::{
    ApiErrorBody, CreatedResponse, NewTask, Project, ProjectEnvelope, User, UsersEnvelope,
};
use crate::config::ApiConfig;
use crate::import::TaskCreator;

/// Client for the project/task REST API
#[derive(Debug, Clone)]
pub struct TaskApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl TaskApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("schedule-import/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.base_url, endpoint)
    }

    /// Fetch a single project
    pub async fn get_project(&self, project_id: i64) -> Result<Project> {
        let url = self.url(&format!("proyectos/{}", project_id));
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let envelope: ProjectEnvelope = read_json(response).await?;
        Ok(envelope.project)
    }

    /// List every user known to the API
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let url = self.url("usuarios");
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let envelope: UsersEnvelope = read_json(response).await?;
        Ok(envelope.users)
    }
}

#[async_trait]
impl TaskCreator for TaskApiClient {
    async fn create_task(&self, project_id: i64, task: &NewTask) -> Result<i64> {
        let url = self.url(&format!("proyectos/{}/tareas", project_id));
        log::debug!("POST {} ('{}')", url, task.title);

        let response = self
            .http
            .post(&url)
            .json(task)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let created: CreatedResponse = read_json(response).await?;
        Ok(created.id)
    }
}

/// Decode a successful JSON body, or turn an error status into its message
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("{}", error_message(status, &body));
    }

    response
        .json::<T>()
        .await
        .context("Failed to decode API response")
}

/// `{"error": "..."}` bodies yield their message, anything else `Error <status>`
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|msg| !msg.trim().is_empty())
        .unwrap_or_else(|| format!("Error {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::TaskStatus;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TaskApiClient {
        let config = ApiConfig {
            base_url: format!("{}/", server.uri()),
            timeout_secs: 5,
            user_agent: None,
        };
        TaskApiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_create_task_posts_wire_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/proyectos/7/tareas"))
            .and(body_json(json!({
                "titulo": "Excavación",
                "estado": "terminado",
                "prioridad": "media",
                "tarea_padre_id": 3
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 42, "success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let mut task = NewTask::new("Excavación");
        task.status = TaskStatus::Done;
        task.parent_task_id = Some(3);

        let id = client_for(&server).create_task(7, &task).await.unwrap();
        assert_eq!(id, 42);
    }

    #[tokio::test]
    async fn test_create_task_surfaces_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/proyectos/7/tareas"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "Título requerido"})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_task(7, &NewTask::new("x"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Título requerido");
    }

    #[tokio::test]
    async fn test_non_json_error_uses_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_task(1, &NewTask::new("x"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Error 502");
    }

    #[tokio::test]
    async fn test_get_project_and_users() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/proyectos/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "proyecto": {"id": 7, "nombre": "Edificio Norte", "estado": "activo", "total_tareas": 12}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/usuarios"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "usuarios": [
                    {"id": 1, "email": "ana@example.com", "nombre": "Ana", "rol": "admin", "activo": true},
                    {"id": 2, "email": "luis@example.com", "nombre": "Luis", "activo": false}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let project = client.get_project(7).await.unwrap();
        assert_eq!(project.name, "Edificio Norte");
        assert_eq!(project.total_tasks, Some(12));

        let users = client.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(!users[1].active);
    }

    #[tokio::test]
    async fn test_missing_project() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/proyectos/99"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Proyecto no encontrado"})))
            .mount(&server)
            .await;

        let err = client_for(&server).get_project(99).await.unwrap_err();
        assert!(err.to_string().contains("Proyecto no encontrado"));
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(error_message(StatusCode::BAD_REQUEST, r#"{"error":"x"}"#), "x");
        assert_eq!(error_message(StatusCode::BAD_REQUEST, r#"{"error":""}"#), "Error 400");
        assert_eq!(error_message(StatusCode::INTERNAL_SERVER_ERROR, ""), "Error 500");
    }
}
