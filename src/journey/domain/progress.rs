//! Values reported back to callers about progression and calendar state.

use crate::task::domain::{Task, TaskId};
use serde::{Deserialize, Serialize};

/// An outstanding task preventing a stage from advancing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingTask {
    /// Task identifier.
    pub id: TaskId,
    /// Task title, for display.
    pub title: String,
}

impl From<&Task> for BlockingTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_owned(),
        }
    }
}

/// Calendar mirroring state of a task as shown to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatusView {
    /// `true` when the task has a due date and can be mirrored.
    pub can_sync: bool,
    /// `true` when an external event currently mirrors the task.
    pub is_synced: bool,
    /// Last calendar error, if any.
    pub sync_error: Option<String>,
}

impl From<&Task> for SyncStatusView {
    fn from(task: &Task) -> Self {
        Self {
            can_sync: task.can_sync(),
            is_synced: task.is_synced(),
            sync_error: task.calendar_error().map(str::to_owned),
        }
    }
}
