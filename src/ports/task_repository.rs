use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{StatusFilter, Task, TaskDraft, TaskId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    /// Non-success status or a transport failure.
    #[error("{0}")]
    Fetch(String),

    /// The server rejected a create or update; carries its message verbatim.
    #[error("{0}")]
    Validation(String),

    /// The response body did not match the expected schema.
    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Client configuration error: {0}")]
    Config(String),
}

impl RepositoryError {
    pub fn message(&self) -> &str {
        match self {
            RepositoryError::Fetch(msg)
            | RepositoryError::Validation(msg)
            | RepositoryError::Decode(msg)
            | RepositoryError::Config(msg) => msg,
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Server-side list filters. Empty search and `all` are omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskQuery {
    pub search: Option<String>,
    pub status: StatusFilter,
}

impl TaskQuery {
    pub fn unfiltered() -> Self {
        Self::default()
    }

    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            params.push(("search".to_string(), search.to_string()));
        }

        if let Some(status) = self.status.as_query_value() {
            params.push(("status".to_string(), status.to_string()));
        }

        params
    }
}

/// Body returned by the API after a delete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn list_tasks(&self, query: &TaskQuery) -> RepositoryResult<Vec<Task>>;
    async fn get_task(&self, id: &TaskId) -> RepositoryResult<Task>;
    async fn create_task(&self, draft: &TaskDraft) -> RepositoryResult<Task>;
    async fn update_task(&self, id: &TaskId, draft: &TaskDraft) -> RepositoryResult<Task>;
    async fn delete_task(&self, id: &TaskId) -> RepositoryResult<DeleteConfirmation>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;

    #[test]
    fn test_query_params_omit_defaults() {
        assert!(TaskQuery::unfiltered().to_query_params().is_empty());

        let query = TaskQuery {
            search: Some(String::new()),
            status: StatusFilter::All,
        };
        assert!(query.to_query_params().is_empty());
    }

    #[test]
    fn test_query_params_include_filters() {
        let query = TaskQuery {
            search: Some("milk".to_string()),
            status: StatusFilter::Only(TaskStatus::InProgress),
        };
        assert_eq!(
            query.to_query_params(),
            vec![
                ("search".to_string(), "milk".to_string()),
                ("status".to_string(), "in-progress".to_string()),
            ]
        );
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = RepositoryError::Validation("Title required".to_string());
        assert_eq!(err.to_string(), "Title required");
        assert_eq!(err.message(), "Title required");
    }
}
