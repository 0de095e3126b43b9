//! Repository port for pipeline entity persistence.

use crate::pipeline::domain::{PipelineEntity, PipelineEntityId, Stage};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for pipeline entity repository operations.
pub type PipelineEntityRepositoryResult<T> = Result<T, PipelineEntityRepositoryError>;

/// Pipeline entity persistence contract.
#[async_trait]
pub trait PipelineEntityRepository: Send + Sync {
    /// Stores a new entity.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineEntityRepositoryError::DuplicateEntity`] when the
    /// identifier already exists.
    async fn store(&self, entity: &PipelineEntity) -> PipelineEntityRepositoryResult<()>;

    /// Finds an entity by identifier.
    ///
    /// Returns `None` when the entity does not exist.
    async fn find_by_id(
        &self,
        id: PipelineEntityId,
    ) -> PipelineEntityRepositoryResult<Option<PipelineEntity>>;

    /// Persists non-stage fields (display name, activity flag, timestamps).
    ///
    /// The stored stage is left untouched; stage moves go through
    /// [`Self::update_stage`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineEntityRepositoryError::NotFound`] when the entity
    /// does not exist.
    async fn update(&self, entity: &PipelineEntity) -> PipelineEntityRepositoryResult<()>;

    /// Writes the entity's stage only if the stored stage still equals
    /// `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineEntityRepositoryError::StageConflict`] when another
    /// writer moved the entity first, or
    /// [`PipelineEntityRepositoryError::NotFound`] when it does not exist.
    async fn update_stage(
        &self,
        entity: &PipelineEntity,
        expected: Stage,
    ) -> PipelineEntityRepositoryResult<()>;
}

/// Errors returned by pipeline entity repository implementations.
#[derive(Debug, Clone, Error)]
pub enum PipelineEntityRepositoryError {
    /// An entity with the same identifier already exists.
    #[error("duplicate pipeline entity identifier: {0}")]
    DuplicateEntity(PipelineEntityId),

    /// The entity was not found.
    #[error("pipeline entity not found: {0}")]
    NotFound(PipelineEntityId),

    /// The stored stage no longer matches the expected stage.
    #[error("pipeline entity {entity_id} is at {actual}, expected {expected}")]
    StageConflict {
        /// Entity whose stage moved.
        entity_id: PipelineEntityId,
        /// Stage the writer expected.
        expected: Stage,
        /// Stage found in storage.
        actual: Stage,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PipelineEntityRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
