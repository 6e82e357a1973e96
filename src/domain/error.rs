use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Required field missing: {0}")]
    MissingField(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
