use crate::domain::DomainError;
use crate::ports::{ConfigError, RepositoryError};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Repository(err) => err.message().to_string(),
            AppError::Domain(DomainError::MissingField(field)) if field == "title" => {
                "Task title is required".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
