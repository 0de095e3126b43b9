//! Auto-task generator: materializes a stage's templates for an entity.

use super::{EntityLocks, GateVerdicts, JourneyError, JourneyResult};
use crate::pipeline::{
    domain::{PipelineEntityId, Stage, StageCatalogue},
    ports::PipelineEntityRepository,
};
use crate::task::{
    domain::Task,
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Idempotent materializer of stage template tasks.
pub struct TaskGenerator<T, E, C>
where
    T: TaskRepository,
    E: PipelineEntityRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    entities: Arc<E>,
    catalogue: Arc<StageCatalogue>,
    locks: Arc<EntityLocks>,
    clock: Arc<C>,
    verdicts: Arc<GateVerdicts>,
}

impl<T, E, C> TaskGenerator<T, E, C>
where
    T: TaskRepository,
    E: PipelineEntityRepository,
    C: Clock + Send + Sync,
{
    /// Creates a generator.
    #[must_use]
    pub fn new(
        tasks: Arc<T>,
        entities: Arc<E>,
        catalogue: Arc<StageCatalogue>,
        locks: Arc<EntityLocks>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            tasks,
            entities,
            catalogue,
            locks,
            clock,
            verdicts: Arc::new(GateVerdicts::default()),
        }
    }

    /// Returns the catalogue templates are drawn from.
    #[must_use]
    pub fn catalogue(&self) -> &StageCatalogue {
        &self.catalogue
    }

    /// Verdict cache cleared whenever a batch lands.
    pub(crate) const fn verdicts(&self) -> &Arc<GateVerdicts> {
        &self.verdicts
    }

    /// Materializes the templates of `stage` for `entity_id` and returns
    /// how many tasks were created.
    ///
    /// Returns 0 without writing when generated tasks already exist for
    /// (entity, stage), when `stage` is not the entity's current stage,
    /// when the entity is inactive, or when the stage has no templates.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::EntityNotFound`] for unknown entities,
    /// [`JourneyError::EntityBusy`] when the entity lock is not obtained in
    /// time, and repository errors.
    #[instrument(skip(self))]
    pub async fn ensure_tasks_for_stage(
        &self,
        entity_id: PipelineEntityId,
        stage: Stage,
    ) -> JourneyResult<usize> {
        let _guard = self.locks.acquire(entity_id).await?;
        self.ensure_while_locked(entity_id, stage).await
    }

    /// Body of [`Self::ensure_tasks_for_stage`] for callers already holding
    /// the entity lock.
    pub(crate) async fn ensure_while_locked(
        &self,
        entity_id: PipelineEntityId,
        stage: Stage,
    ) -> JourneyResult<usize> {
        let entity = self
            .entities
            .find_by_id(entity_id)
            .await?
            .ok_or(JourneyError::EntityNotFound(entity_id))?;

        if !entity.is_active() || entity.stage() != stage {
            debug!(current = %entity.stage(), active = entity.is_active(), "skipping generation");
            return Ok(0);
        }

        let existing = self.tasks.find_by_stage(entity_id, stage).await?;
        if existing.iter().any(Task::is_auto_generated) {
            debug!("stage tasks already materialized");
            return Ok(0);
        }

        let batch: Vec<Task> = self
            .catalogue
            .templates_for_stage(stage)
            .iter()
            .map(|template| Task::from_template(template, entity_id, &*self.clock))
            .collect();
        if batch.is_empty() {
            return Ok(0);
        }

        match self.tasks.store_generated(&batch).await {
            Ok(()) => {
                self.verdicts.invalidate(entity_id);
                info!(created = batch.len(), "materialized stage tasks");
                Ok(batch.len())
            }
            Err(TaskRepositoryError::DuplicateGeneratedTask { template, .. }) => {
                // Another writer outside this process got there first.
                self.verdicts.invalidate(entity_id);
                debug!(%template, "stage tasks materialized concurrently");
                Ok(0)
            }
            Err(err) => Err(err.into()),
        }
    }
}
