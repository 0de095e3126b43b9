//! External calendar port.

use crate::task::domain::{Task, TaskId};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for calendar operations.
pub type CalendarResult<T> = Result<T, CalendarError>;

/// Push/remove access to the external calendar, keyed by task identity.
///
/// Implementations must be idempotent per task: pushing twice updates the
/// same event, removing a missing event succeeds.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Creates or updates the event mirroring `task`.
    async fn push_event(&self, task: &Task) -> CalendarResult<()>;

    /// Removes the event mirroring the task, if any.
    async fn remove_event(&self, task_id: TaskId) -> CalendarResult<()>;
}

/// Errors returned by calendar adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalendarError {
    /// The calendar could not be reached.
    #[error("calendar unreachable: {0}")]
    Unreachable(String),

    /// The calendar refused the request.
    #[error("calendar rejected task {task_id}: {reason}")]
    Rejected {
        /// Task the request concerned.
        task_id: TaskId,
        /// Reason given by the calendar.
        reason: String,
    },

    /// The call exceeded the configured bound.
    #[error("calendar call timed out after {0:?}")]
    Timeout(Duration),
}
