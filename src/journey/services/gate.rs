//! Progression gate: decides and performs stage advancement.

use super::{AuditTrail, EntityLocks, GateVerdicts, JourneyError, JourneyResult, TaskGenerator};
use crate::journey::{
    domain::{AuditAction, AuditEntry, AuditSubject, BlockingTask, FieldChange},
    ports::AuditSink,
};
use crate::pipeline::{
    domain::{PipelineEntity, PipelineEntityId, Stage, UserId},
    ports::PipelineEntityRepository,
};
use crate::task::ports::TaskRepository;
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Decides whether an entity may leave its stage and moves it forward.
///
/// `can_advance` answers are cached per entity and stage. The coordinator
/// invalidates an entry whenever a blocking task of that entity changes and
/// the generator does so after every materialized batch.
/// `advance` always re-reads the blocking tasks under the entity lock.
pub struct ProgressionGate<T, E, A, C>
where
    T: TaskRepository,
    E: PipelineEntityRepository,
    A: AuditSink,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    entities: Arc<E>,
    generator: Arc<TaskGenerator<T, E, C>>,
    audit: AuditTrail<A>,
    locks: Arc<EntityLocks>,
    clock: Arc<C>,
    verdicts: Arc<GateVerdicts>,
}

impl<T, E, A, C> ProgressionGate<T, E, A, C>
where
    T: TaskRepository,
    E: PipelineEntityRepository,
    A: AuditSink,
    C: Clock + Send + Sync,
{
    /// Creates a gate sharing the generator's lock table and verdict cache.
    #[must_use]
    pub fn new(
        tasks: Arc<T>,
        entities: Arc<E>,
        generator: Arc<TaskGenerator<T, E, C>>,
        audit: Arc<A>,
        locks: Arc<EntityLocks>,
        clock: Arc<C>,
    ) -> Self {
        let verdicts = Arc::clone(generator.verdicts());
        Self {
            tasks,
            entities,
            generator,
            audit: AuditTrail::new(audit),
            locks,
            clock,
            verdicts,
        }
    }

    /// Returns `true` when no blocking task of the entity's current stage
    /// is outstanding. Always `false` at the terminal stage.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::EntityNotFound`] for unknown entities and
    /// repository errors.
    pub async fn can_advance(&self, entity_id: PipelineEntityId) -> JourneyResult<bool> {
        let seen = self.verdicts.generation();
        let entity = self.load(entity_id).await?;
        if self.generator.catalogue().next_stage(entity.stage()).is_none() {
            return Ok(false);
        }
        if let Some(verdict) = self.verdicts.cached(entity_id, entity.stage()) {
            debug!(%entity_id, verdict, "gate cache hit");
            return Ok(verdict);
        }
        let blocking = self.blocking_for(&entity).await?;
        let verdict = blocking.is_empty();
        self.verdicts
            .remember(entity_id, entity.stage(), verdict, seen);
        Ok(verdict)
    }

    /// Returns the outstanding blocking tasks of the entity's current stage.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::EntityNotFound`] for unknown entities and
    /// repository errors.
    pub async fn blocking_tasks(
        &self,
        entity_id: PipelineEntityId,
    ) -> JourneyResult<Vec<BlockingTask>> {
        let entity = self.load(entity_id).await?;
        self.blocking_for(&entity).await
    }

    /// Moves the entity to its next stage and materializes that stage's
    /// tasks, returning the new stage.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::StageBlocked`] listing the outstanding tasks,
    /// [`JourneyError::AlreadyTerminal`] at the end of the pipeline,
    /// [`JourneyError::EntityInactive`] for deactivated entities, the
    /// transient [`JourneyError::EntityBusy`] or
    /// [`JourneyError::StageConflict`] under contention, and repository
    /// errors.
    #[instrument(skip(self))]
    pub async fn advance(
        &self,
        entity_id: PipelineEntityId,
        actor: Option<UserId>,
    ) -> JourneyResult<Stage> {
        let _guard = self.locks.acquire(entity_id).await?;

        let mut entity = self.load(entity_id).await?;
        if !entity.is_active() {
            return Err(JourneyError::EntityInactive(entity_id));
        }

        let from = entity.stage();
        let seen = self.verdicts.generation();
        let blocking = self.blocking_for(&entity).await?;
        if !blocking.is_empty() {
            self.verdicts.remember(entity_id, from, false, seen);
            return Err(JourneyError::StageBlocked {
                entity_id,
                stage: from,
                blocking,
            });
        }

        let Some(next) = self.generator.catalogue().next_stage(from) else {
            return Err(JourneyError::AlreadyTerminal(entity_id));
        };

        entity.advance_to(next, &*self.clock)?;
        self.entities.update_stage(&entity, from).await?;
        self.invalidate(entity_id);
        info!(%entity_id, %from, to = %next, "pipeline entity advanced");

        self.audit
            .record(AuditEntry::new(
                AuditSubject::Entity(entity_id),
                AuditAction::StageAdvanced,
                vec![FieldChange::new(
                    "stage",
                    Some(from.to_string()),
                    Some(next.to_string()),
                )],
                actor,
                &*self.clock,
            ))
            .await;

        self.generator.ensure_while_locked(entity_id, next).await?;
        Ok(next)
    }

    /// Drops any cached verdict for the entity.
    pub fn invalidate(&self, entity_id: PipelineEntityId) {
        self.verdicts.invalidate(entity_id);
    }

    async fn load(&self, entity_id: PipelineEntityId) -> JourneyResult<PipelineEntity> {
        self.entities
            .find_by_id(entity_id)
            .await?
            .ok_or(JourneyError::EntityNotFound(entity_id))
    }

    async fn blocking_for(&self, entity: &PipelineEntity) -> JourneyResult<Vec<BlockingTask>> {
        let tasks = self.tasks.find_by_stage(entity.id(), entity.stage()).await?;
        let mut blocking: Vec<BlockingTask> = tasks
            .iter()
            .filter(|task| task.holds_stage(entity.id(), entity.stage()))
            .map(BlockingTask::from)
            .collect();
        blocking.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        Ok(blocking)
    }
}
