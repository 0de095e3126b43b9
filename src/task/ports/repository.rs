//! Repository port for task persistence and lookup.

use super::TaskQuery;
use crate::pipeline::domain::{PipelineEntityId, Stage, TemplateKey};
use crate::task::domain::{Task, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists or [`TaskRepositoryError::DuplicateGeneratedTask`] when a
    /// generated task for the same (entity, stage, template) exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Stores a batch of generated tasks atomically: either every task is
    /// stored or none is.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateGeneratedTask`] when any task
    /// collides with the (entity, stage, template) uniqueness constraint.
    async fn store_generated(&self, tasks: &[Task]) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Removes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every task linked to (entity, stage), generated or not.
    async fn find_by_stage(
        &self,
        entity_id: PipelineEntityId,
        stage: Stage,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns tasks matching the query, in no particular order.
    async fn list(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A generated task already exists for the template at this stage.
    #[error("task template {template} already materialized for entity {entity_id} at {stage}")]
    DuplicateGeneratedTask {
        /// Owning entity.
        entity_id: PipelineEntityId,
        /// Stage of the template.
        stage: Stage,
        /// Template key.
        template: TemplateKey,
    },

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
