//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,
}

/// Error returned while parsing task enum values from persistence or input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task {kind}: {value}")]
pub struct ParseTaskValueError {
    /// Which value family failed to parse (`status`, `priority`, ...).
    pub kind: &'static str,
    /// Raw input.
    pub value: String,
}

impl ParseTaskValueError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}
