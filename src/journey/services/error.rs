//! Service-level errors for journey operations.

use crate::journey::domain::{BlockingTask, Capability};
use crate::pipeline::{
    domain::{PipelineDomainError, PipelineEntityId, Stage},
    ports::PipelineEntityRepositoryError,
};
use crate::task::{
    domain::{TaskDomainError, TaskId},
    ports::TaskRepositoryError,
};
use thiserror::Error;

/// Errors returned by journey services.
#[derive(Debug, Error)]
pub enum JourneyError {
    /// Outstanding blocking tasks hold the entity at its stage.
    #[error("pipeline entity {entity_id} is blocked at {stage} by {} task(s)", .blocking.len())]
    StageBlocked {
        /// Entity that could not advance.
        entity_id: PipelineEntityId,
        /// Stage it is held at.
        stage: Stage,
        /// Tasks that must be completed first.
        blocking: Vec<BlockingTask>,
    },

    /// The entity is already at the terminal stage.
    #[error("pipeline entity {0} has already completed the pipeline")]
    AlreadyTerminal(PipelineEntityId),

    /// Another request holds the entity; retry later.
    #[error("pipeline entity {0} is busy, try again")]
    EntityBusy(PipelineEntityId),

    /// Another writer moved the entity's stage first; retry later.
    #[error("pipeline entity {entity_id} moved concurrently: expected {expected}, found {actual}")]
    StageConflict {
        /// Entity whose stage moved.
        entity_id: PipelineEntityId,
        /// Stage the request started from.
        expected: Stage,
        /// Stage found in storage.
        actual: Stage,
    },

    /// The entity has been deactivated.
    #[error("pipeline entity {0} is inactive")]
    EntityInactive(PipelineEntityId),

    /// No entity exists with the given identifier.
    #[error("pipeline entity {0} not found")]
    EntityNotFound(PipelineEntityId),

    /// No task exists with the given identifier, or it is not visible to
    /// the caller.
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    /// The caller lacks the capability.
    #[error("caller is not permitted to {0:?}")]
    Forbidden(Capability),

    /// Pipeline domain validation failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineDomainError),

    /// Task domain validation failed.
    #[error(transparent)]
    Task(#[from] TaskDomainError),

    /// Task repository operation failed.
    #[error(transparent)]
    TaskRepository(TaskRepositoryError),

    /// Entity repository operation failed.
    #[error(transparent)]
    EntityRepository(PipelineEntityRepositoryError),
}

impl From<PipelineEntityRepositoryError> for JourneyError {
    fn from(err: PipelineEntityRepositoryError) -> Self {
        match err {
            PipelineEntityRepositoryError::StageConflict {
                entity_id,
                expected,
                actual,
            } => Self::StageConflict {
                entity_id,
                expected,
                actual,
            },
            PipelineEntityRepositoryError::NotFound(entity_id) => Self::EntityNotFound(entity_id),
            other => Self::EntityRepository(other),
        }
    }
}

impl From<TaskRepositoryError> for JourneyError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(task_id) => Self::TaskNotFound(task_id),
            other => Self::TaskRepository(other),
        }
    }
}

impl JourneyError {
    /// Returns `true` when retrying the same request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::EntityBusy(_) | Self::StageConflict { .. })
    }

    /// Returns the blocking tasks for [`JourneyError::StageBlocked`].
    #[must_use]
    pub fn blocking_tasks(&self) -> &[BlockingTask] {
        match self {
            Self::StageBlocked { blocking, .. } => blocking,
            _ => &[],
        }
    }
}

/// Result type for journey service operations.
pub type JourneyResult<T> = Result<T, JourneyError>;
