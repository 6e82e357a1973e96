use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{DomainError, DomainResult};
use super::filter::StatusFilter;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    /// Parse a user-supplied identifier, rejecting blank input.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidId(raw.to_string()));
        }
        Ok(TaskId(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        TaskId(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

/// Lifecycle stage of a task as it appears on the wire.
///
/// Anything the API sends outside the three known values lands in
/// `Unrecognized`; it renders as `Todo` but never matches a concrete
/// status filter or per-status count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
    #[serde(other)]
    Unrecognized,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// Status used for display purposes.
    pub fn effective(self) -> Self {
        match self {
            TaskStatus::Unrecognized => TaskStatus::Todo,
            other => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self.effective() {
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
            _ => "todo",
        }
    }

    pub fn label(self) -> &'static str {
        match self.effective() {
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            _ => "To Do",
        }
    }

    pub fn icon(self) -> &'static str {
        match self.effective() {
            TaskStatus::InProgress => "⏱",
            TaskStatus::Completed => "✓",
            _ => "○",
        }
    }

    pub fn next(self) -> Self {
        match self.effective() {
            TaskStatus::Todo => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Completed,
            _ => TaskStatus::Todo,
        }
    }

    pub fn previous(self) -> Self {
        match self.effective() {
            TaskStatus::Todo => TaskStatus::Completed,
            TaskStatus::InProgress => TaskStatus::Todo,
            _ => TaskStatus::InProgress,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "todo" => Ok(TaskStatus::Todo),
            "in-progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(DomainError::InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// True once the API has stamped an update distinct from creation.
    pub fn was_updated(&self) -> bool {
        self.updated_at
            .map(|updated| updated != self.created_at)
            .unwrap_or(false)
    }

    /// Short creation date for list rows, e.g. `Mar 4, 2025`.
    pub fn created_display(&self) -> String {
        self.created_at.format("%b %-d, %Y").to_string()
    }

    /// Long timestamp for the detail screen, e.g. `March 4, 2025 09:30`.
    pub fn timestamp_display(at: &DateTime<Utc>) -> String {
        at.format("%B %-d, %Y %H:%M").to_string()
    }
}

/// Caller-supplied fields for create and update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status,
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            status: task.status.effective(),
        }
    }

    pub fn normalized(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            status: self.status.effective(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::MissingField("title".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCounts {
    pub all: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl TaskCounts {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();

        Self {
            all: tasks.len(),
            todo: count(TaskStatus::Todo),
            in_progress: count(TaskStatus::InProgress),
            completed: count(TaskStatus::Completed),
        }
    }

    pub fn count_for(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.all,
            StatusFilter::Only(TaskStatus::Todo) => self.todo,
            StatusFilter::Only(TaskStatus::InProgress) => self.in_progress,
            StatusFilter::Only(TaskStatus::Completed) => self.completed,
            StatusFilter::Only(TaskStatus::Unrecognized) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, title: &str, status: TaskStatus) -> Task {
        Task {
            id: id.into(),
            title: title.to_string(),
            description: None,
            status,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_status_wire_names() {
        let parsed: Vec<TaskStatus> =
            serde_json::from_str(r#"["todo","in-progress","completed","blocked"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                TaskStatus::Todo,
                TaskStatus::InProgress,
                TaskStatus::Completed,
                TaskStatus::Unrecognized
            ]
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            r#""in-progress""#
        );
    }

    #[test]
    fn test_unrecognized_status_displays_as_todo() {
        assert_eq!(TaskStatus::Unrecognized.label(), "To Do");
        assert_eq!(TaskStatus::Unrecognized.icon(), "○");
        assert_eq!(TaskStatus::Unrecognized.as_str(), "todo");
        assert!("blocked".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_status_cycles_through_known_values() {
        let mut status = TaskStatus::Todo;
        for expected in [TaskStatus::InProgress, TaskStatus::Completed, TaskStatus::Todo] {
            status = status.next();
            assert_eq!(status, expected);
        }
        assert_eq!(TaskStatus::Todo.previous(), TaskStatus::Completed);
    }

    #[test]
    fn test_counts_match_scenario() {
        let tasks = vec![
            task("1", "Buy milk", TaskStatus::Todo),
            task("2", "Write report", TaskStatus::Completed),
        ];

        let counts = TaskCounts::from_tasks(&tasks);
        assert_eq!(
            counts,
            TaskCounts {
                all: 2,
                todo: 1,
                in_progress: 0,
                completed: 1
            }
        );
    }

    #[test]
    fn test_counts_sum_to_length_for_valid_statuses() {
        let tasks: Vec<Task> = (0..9)
            .map(|i| task(&i.to_string(), "t", TaskStatus::ALL[i % 3]))
            .collect();

        let counts = TaskCounts::from_tasks(&tasks);
        assert_eq!(counts.all, tasks.len());
        assert_eq!(counts.todo + counts.in_progress + counts.completed, tasks.len());
    }

    #[test]
    fn test_unrecognized_status_not_counted_as_todo() {
        let tasks = vec![task("1", "odd", TaskStatus::Unrecognized)];
        let counts = TaskCounts::from_tasks(&tasks);
        assert_eq!(counts.all, 1);
        assert_eq!(counts.todo, 0);
    }

    #[test]
    fn test_draft_validation_and_normalization() {
        let draft = TaskDraft::new("   ", "notes", TaskStatus::Todo);
        assert_eq!(
            draft.validate(),
            Err(DomainError::MissingField("title".to_string()))
        );

        let draft = TaskDraft::new("  Ship it  ", " soon ", TaskStatus::Unrecognized).normalized();
        assert_eq!(draft.title, "Ship it");
        assert_eq!(draft.description, "soon");
        assert_eq!(draft.status, TaskStatus::Todo);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_task_id_parse_rejects_blank() {
        assert!(TaskId::parse("  ").is_err());
        assert_eq!(TaskId::parse(" abc ").unwrap(), TaskId::from("abc"));
    }

    #[test]
    fn test_was_updated() {
        let mut t = task("1", "a", TaskStatus::Todo);
        assert!(!t.was_updated());
        t.updated_at = Some(t.created_at);
        assert!(!t.was_updated());
        t.updated_at = Some(t.created_at + chrono::Duration::minutes(5));
        assert!(t.was_updated());
    }
}
