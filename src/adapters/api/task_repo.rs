use async_trait::async_trait;
use serde_json::Value;

use super::{
    confirmation_from_value, task_from_value, task_list_from_value, ApiClient, TaskPayload,
};
use crate::domain::{Task, TaskDraft, TaskId};
use crate::ports::{DeleteConfirmation, RepositoryResult, TaskQuery, TaskRepository};

const LIST_FAILED: &str = "Failed to fetch tasks";
const GET_FAILED: &str = "Failed to fetch task";
const CREATE_FAILED: &str = "Failed to create task";
const UPDATE_FAILED: &str = "Failed to update task";
const DELETE_FAILED: &str = "Failed to delete task";

#[derive(Clone)]
pub struct HttpTaskRepository {
    client: ApiClient,
}

impl HttpTaskRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn build_query_string(params: &[(String, String)]) -> String {
        if params.is_empty() {
            return String::new();
        }

        format!(
            "?{}",
            params
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&")
        )
    }

    fn task_path(id: &TaskId) -> String {
        format!("/tasks/{}", urlencoding::encode(id.as_str()))
    }
}

#[async_trait]
impl TaskRepository for HttpTaskRepository {
    async fn list_tasks(&self, query: &TaskQuery) -> RepositoryResult<Vec<Task>> {
        let query_string = Self::build_query_string(&query.to_query_params());
        let path = format!("/tasks{query_string}");

        let body: Value = self
            .client
            .get(&path, LIST_FAILED)
            .await?
            .into_json(LIST_FAILED)?;
        task_list_from_value(body)
    }

    async fn get_task(&self, id: &TaskId) -> RepositoryResult<Task> {
        let body: Value = self
            .client
            .get(&Self::task_path(id), GET_FAILED)
            .await?
            .into_json(GET_FAILED)?;
        task_from_value(body)
    }

    async fn create_task(&self, draft: &TaskDraft) -> RepositoryResult<Task> {
        let payload = TaskPayload::from(draft);
        let body: Value = self
            .client
            .post("/tasks", &payload, CREATE_FAILED)
            .await?
            .into_validated(CREATE_FAILED)?;
        task_from_value(body)
    }

    async fn update_task(&self, id: &TaskId, draft: &TaskDraft) -> RepositoryResult<Task> {
        let payload = TaskPayload::from(draft);
        let body: Value = self
            .client
            .put(&Self::task_path(id), &payload, UPDATE_FAILED)
            .await?
            .into_validated(UPDATE_FAILED)?;
        task_from_value(body)
    }

    async fn delete_task(&self, id: &TaskId) -> RepositoryResult<DeleteConfirmation> {
        let response = self
            .client
            .delete(&Self::task_path(id), DELETE_FAILED)
            .await?;

        // Some backends answer 204 with no body.
        if response.status.is_success() && response.body.trim().is_empty() {
            return Ok(DeleteConfirmation::default());
        }
        let body: Value = response.into_json(DELETE_FAILED)?;
        Ok(confirmation_from_value(body))
    }
}
