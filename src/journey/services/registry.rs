//! Recording and retiring pipeline entities.

use super::{
    AuditTrail, EntityLocks, JourneyError, JourneyResult, RegisterEntityRequest, TaskGenerator,
};
use crate::journey::{
    domain::{AuditAction, AuditEntry, AuditSubject, FieldChange},
    ports::AuditSink,
};
use crate::pipeline::{
    domain::{PipelineEntity, PipelineEntityId, UserId},
    ports::PipelineEntityRepository,
};
use crate::task::ports::TaskRepository;
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, instrument};

/// Creates entities at the first stage and deactivates them. Entities are
/// never deleted.
pub struct PipelineRegistryService<T, E, A, C>
where
    T: TaskRepository,
    E: PipelineEntityRepository,
    A: AuditSink,
    C: Clock + Send + Sync,
{
    entities: Arc<E>,
    generator: Arc<TaskGenerator<T, E, C>>,
    audit: AuditTrail<A>,
    locks: Arc<EntityLocks>,
    clock: Arc<C>,
}

impl<T, E, A, C> PipelineRegistryService<T, E, A, C>
where
    T: TaskRepository,
    E: PipelineEntityRepository,
    A: AuditSink,
    C: Clock + Send + Sync,
{
    /// Creates a registry service.
    #[must_use]
    pub const fn new(
        entities: Arc<E>,
        generator: Arc<TaskGenerator<T, E, C>>,
        audit: Arc<A>,
        locks: Arc<EntityLocks>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            entities,
            generator,
            audit: AuditTrail::new(audit),
            locks,
            clock,
        }
    }

    /// Records a new entity at the first stage and materializes that
    /// stage's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::Pipeline`] for a blank display name and
    /// repository errors.
    #[instrument(skip(self, request), fields(kind = %request.kind))]
    pub async fn register(
        &self,
        request: RegisterEntityRequest,
        actor: Option<UserId>,
    ) -> JourneyResult<PipelineEntity> {
        let entity = PipelineEntity::new(
            request.kind,
            request.display_name,
            request.organization_id,
            &*self.clock,
        )?;
        self.entities.store(&entity).await?;
        let created = self
            .generator
            .ensure_tasks_for_stage(entity.id(), entity.stage())
            .await?;
        info!(entity_id = %entity.id(), created, "pipeline entity registered");

        self.audit
            .record(AuditEntry::new(
                AuditSubject::Entity(entity.id()),
                AuditAction::Created,
                vec![
                    FieldChange::set("kind", entity.kind().as_str()),
                    FieldChange::set("display_name", entity.display_name()),
                    FieldChange::set("stage", entity.stage().as_str()),
                    FieldChange::set("organization_id", entity.organization_id().to_string()),
                ],
                actor,
                &*self.clock,
            ))
            .await;
        Ok(entity)
    }

    /// Deactivates an entity; its tasks stay in place.
    ///
    /// Returns the entity. Deactivating twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::EntityNotFound`], the transient
    /// [`JourneyError::EntityBusy`] and repository errors.
    #[instrument(skip(self))]
    pub async fn deactivate(
        &self,
        entity_id: PipelineEntityId,
        actor: Option<UserId>,
    ) -> JourneyResult<PipelineEntity> {
        let guard = self.locks.acquire(entity_id).await?;
        let mut entity = self
            .entities
            .find_by_id(entity_id)
            .await?
            .ok_or(JourneyError::EntityNotFound(entity_id))?;
        if !entity.deactivate(&*self.clock) {
            return Ok(entity);
        }
        self.entities.update(&entity).await?;
        drop(guard);

        info!(%entity_id, "pipeline entity deactivated");
        self.audit
            .record(AuditEntry::new(
                AuditSubject::Entity(entity_id),
                AuditAction::Deactivated,
                vec![FieldChange::new(
                    "active",
                    Some(true.to_string()),
                    Some(false.to_string()),
                )],
                actor,
                &*self.clock,
            ))
            .await;
        Ok(entity)
    }
}
