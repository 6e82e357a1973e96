use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::*;
use crate::ports::{DeleteConfirmation, RepositoryError, RepositoryResult};

// Wire shape of a task as returned by the API
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

// Request body for create and update
#[derive(Debug, Serialize)]
pub struct TaskPayload {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl TryFrom<TaskDto> for Task {
    type Error = RepositoryError;

    fn try_from(dto: TaskDto) -> Result<Self, Self::Error> {
        if dto.id.trim().is_empty() {
            return Err(RepositoryError::Decode("task has an empty id".to_string()));
        }

        Ok(Self {
            id: TaskId(dto.id),
            title: dto.title,
            description: dto.description,
            status: dto.status.unwrap_or_default(),
            created_at: dto.created_at,
            updated_at: dto.updated_at,
        })
    }
}

impl From<&TaskDraft> for TaskPayload {
    fn from(draft: &TaskDraft) -> Self {
        Self {
            title: draft.title.clone(),
            description: draft.description.clone(),
            status: draft.status.effective(),
        }
    }
}

pub fn task_from_value(value: Value) -> RepositoryResult<Task> {
    let dto: TaskDto = serde_json::from_value(value)
        .map_err(|e| RepositoryError::Decode(format!("Failed to parse task: {e}")))?;
    dto.try_into()
}

/// Decode a list body. Anything other than a JSON array yields no tasks;
/// a malformed element fails the whole list.
pub fn task_list_from_value(value: Value) -> RepositoryResult<Vec<Task>> {
    match value {
        Value::Array(items) => items.into_iter().map(task_from_value).collect(),
        other => {
            tracing::warn!("Expected a task array, got: {}", other);
            Ok(Vec::new())
        }
    }
}

/// Any JSON is an acceptable delete acknowledgement; only a string
/// `message` is kept.
pub fn confirmation_from_value(value: Value) -> DeleteConfirmation {
    let message = match value {
        Value::Object(mut fields) => match fields.remove("message") {
            Some(Value::String(message)) => Some(message),
            _ => None,
        },
        _ => None,
    };
    DeleteConfirmation { message }
}
