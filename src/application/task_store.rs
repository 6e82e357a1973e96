use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::{AppError, AppResult};
use crate::domain::*;
use crate::ports::{TaskQuery, TaskRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A short user-facing message raised by a store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub tasks: Vec<Task>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct StoreState {
    tasks: Vec<Task>,
    loading: bool,
    error: Option<String>,
}

/// Session-wide task collection backed by a [`TaskRepository`].
///
/// Every mutation is applied in one step after its request resolves; no
/// lock is held across a network call. Overlapping operations are not
/// serialized, so a replace or remove that no longer finds its id does
/// nothing.
pub struct TaskStore {
    repository: Arc<dyn TaskRepository>,
    state: RwLock<StoreState>,
    notifications: Mutex<Vec<Notification>>,
}

impl TaskStore {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self {
            repository,
            state: RwLock::new(StoreState::default()),
            notifications: Mutex::new(Vec::new()),
        }
    }

    /// Replace the collection with the full, unfiltered list from the API.
    /// Failures land in `error()` instead of being returned.
    pub async fn load(&self) {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        let result = self.repository.list_tasks(&TaskQuery::unfiltered()).await;

        let failure = {
            let mut state = self.state.write().await;
            let failure = match result {
                Ok(tasks) => {
                    tracing::info!("Loaded {} tasks", tasks.len());
                    state.tasks = tasks;
                    None
                }
                Err(err) => {
                    let message = if err.message().is_empty() {
                        "Failed to load tasks".to_string()
                    } else {
                        err.message().to_string()
                    };
                    tracing::warn!("Error loading tasks: {}", err);
                    state.error = Some(message.clone());
                    state.tasks.clear();
                    Some(message)
                }
            };
            state.loading = false;
            failure
        };

        if let Some(message) = failure {
            self.notify(NotificationLevel::Error, message).await;
        }
    }

    pub async fn create(&self, draft: &TaskDraft) -> AppResult<Task> {
        let draft = draft.normalized();
        if let Err(err) = draft.validate() {
            return Err(self.fail("create task", err.into()).await);
        }

        let task = match self.repository.create_task(&draft).await {
            Ok(task) => task,
            Err(err) => return Err(self.fail("create task", err.into()).await),
        };

        {
            let mut state = self.state.write().await;
            match state.tasks.iter_mut().find(|t| t.id == task.id) {
                Some(existing) => *existing = task.clone(),
                None => state.tasks.push(task.clone()),
            }
        }

        tracing::info!("Created task {}", task.id);
        self.notify(NotificationLevel::Success, "Task created successfully!")
            .await;
        Ok(task)
    }

    pub async fn update(&self, id: &TaskId, draft: &TaskDraft) -> AppResult<Task> {
        let draft = draft.normalized();
        if let Err(err) = draft.validate() {
            return Err(self.fail("update task", err.into()).await);
        }

        let task = match self.repository.update_task(id, &draft).await {
            Ok(task) => task,
            Err(err) => return Err(self.fail("update task", err.into()).await),
        };

        {
            let mut state = self.state.write().await;
            for entry in state.tasks.iter_mut().filter(|t| &t.id == id) {
                *entry = task.clone();
            }
        }

        tracing::info!("Updated task {}", id);
        self.notify(NotificationLevel::Success, "Task updated successfully!")
            .await;
        Ok(task)
    }

    pub async fn remove(&self, id: &TaskId) -> AppResult<()> {
        if let Err(err) = self.repository.delete_task(id).await {
            return Err(self.fail("delete task", err.into()).await);
        }

        self.state.write().await.tasks.retain(|t| &t.id != id);

        tracing::info!("Deleted task {}", id);
        self.notify(NotificationLevel::Success, "Task deleted successfully!")
            .await;
        Ok(())
    }

    /// Always a fresh fetch; the local collection is neither read nor updated.
    pub async fn get_by_id(&self, id: &TaskId) -> AppResult<Task> {
        match self.repository.get_task(id).await {
            Ok(task) => Ok(task),
            Err(err) => Err(self.fail("fetch task", err.into()).await),
        }
    }

    pub async fn counts(&self) -> TaskCounts {
        TaskCounts::from_tasks(&self.state.read().await.tasks)
    }

    pub async fn tasks(&self) -> Vec<Task> {
        self.state.read().await.tasks.clone()
    }

    pub async fn filtered(&self, filter: &TaskFilter) -> Vec<Task> {
        filter.apply(&self.state.read().await.tasks)
    }

    /// True only while a `load` request is in flight.
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read().await;
        StoreSnapshot {
            tasks: state.tasks.clone(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    /// Drain queued notifications, oldest first.
    pub async fn take_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notifications.lock().await)
    }

    async fn notify(&self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.lock().await.push(Notification {
            level,
            message: message.into(),
        });
    }

    async fn fail(&self, action: &str, err: AppError) -> AppError {
        tracing::warn!("Failed to {}: {}", action, err);
        self.notify(NotificationLevel::Error, err.user_message()).await;
        err
    }
}
