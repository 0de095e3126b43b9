//! In-memory repository for pipeline entities.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::pipeline::{
    domain::{PersistedEntityData, PipelineEntity, PipelineEntityId, Stage},
    ports::{
        PipelineEntityRepository, PipelineEntityRepositoryError, PipelineEntityRepositoryResult,
    },
};

/// Thread-safe in-memory pipeline entity repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPipelineEntityRepository {
    entities: Arc<RwLock<HashMap<PipelineEntityId, PipelineEntity>>>,
}

impl InMemoryPipelineEntityRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> PipelineEntityRepositoryError {
    PipelineEntityRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl PipelineEntityRepository for InMemoryPipelineEntityRepository {
    async fn store(&self, entity: &PipelineEntity) -> PipelineEntityRepositoryResult<()> {
        let mut entities = self.entities.write().map_err(lock_error)?;
        if entities.contains_key(&entity.id()) {
            return Err(PipelineEntityRepositoryError::DuplicateEntity(entity.id()));
        }
        entities.insert(entity.id(), entity.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: PipelineEntityId,
    ) -> PipelineEntityRepositoryResult<Option<PipelineEntity>> {
        let entities = self.entities.read().map_err(lock_error)?;
        Ok(entities.get(&id).cloned())
    }

    async fn update(&self, entity: &PipelineEntity) -> PipelineEntityRepositoryResult<()> {
        let mut entities = self.entities.write().map_err(lock_error)?;
        let stored = entities
            .get_mut(&entity.id())
            .ok_or(PipelineEntityRepositoryError::NotFound(entity.id()))?;

        // Keep the stored stage; only `update_stage` may move it.
        *stored = PipelineEntity::from_persisted(PersistedEntityData {
            id: entity.id(),
            kind: entity.kind(),
            display_name: entity.display_name().to_owned(),
            stage: stored.stage(),
            organization_id: entity.organization_id(),
            active: entity.is_active(),
            created_at: entity.created_at(),
            updated_at: entity.updated_at(),
        });
        Ok(())
    }

    async fn update_stage(
        &self,
        entity: &PipelineEntity,
        expected: Stage,
    ) -> PipelineEntityRepositoryResult<()> {
        let mut entities = self.entities.write().map_err(lock_error)?;
        let stored = entities
            .get_mut(&entity.id())
            .ok_or(PipelineEntityRepositoryError::NotFound(entity.id()))?;
        if stored.stage() != expected {
            return Err(PipelineEntityRepositoryError::StageConflict {
                entity_id: entity.id(),
                expected,
                actual: stored.stage(),
            });
        }
        *stored = entity.clone();
        Ok(())
    }
}
