//! Shared test helpers for in-memory journey integration tests.

use journey_engine::config::JourneyConfig;
use journey_engine::journey::{
    adapters::{
        SurfacePolicy,
        memory::{InMemoryAuditLog, InMemoryCalendar},
    },
    domain::Caller,
    services::{JourneyPorts, RegisterEntityRequest, TaskCoordinator},
};
use journey_engine::pipeline::{
    adapters::memory::InMemoryPipelineEntityRepository,
    domain::{EntityKind, OrganizationId, PipelineEntity, PipelineEntityId, Stage, UserId},
};
use journey_engine::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Task, TaskStatus},
    ports::TaskFilter,
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Coordinator wired to the in-memory adapters.
pub type Engine = TaskCoordinator<
    InMemoryTaskRepository,
    InMemoryPipelineEntityRepository,
    InMemoryCalendar,
    InMemoryAuditLog,
    DefaultClock,
>;

/// Engine under test plus handles on the adapters it talks to.
pub struct Journey {
    pub engine: Arc<Engine>,
    pub calendar: Arc<InMemoryCalendar>,
    pub audit: Arc<InMemoryAuditLog>,
    pub admin: Caller,
}

impl Journey {
    /// Builds an engine from `config`, using its catalogue.
    ///
    /// # Panics
    ///
    /// Panics when the configured catalogue is invalid.
    #[must_use]
    pub fn with_config(config: &JourneyConfig) -> Self {
        let catalogue = config.catalogue().expect("valid catalogue");
        let calendar = Arc::new(InMemoryCalendar::new());
        let audit = Arc::new(InMemoryAuditLog::new());
        let engine = TaskCoordinator::new(
            JourneyPorts {
                tasks: Arc::new(InMemoryTaskRepository::new()),
                entities: Arc::new(InMemoryPipelineEntityRepository::new()),
                calendar: Arc::clone(&calendar),
                audit: Arc::clone(&audit),
                policy: Arc::new(SurfacePolicy::new(config.portal_may_create_tasks)),
            },
            catalogue,
            config,
            Arc::new(DefaultClock),
        );
        Self {
            engine: Arc::new(engine),
            calendar,
            audit,
            admin: Caller::admin(UserId::new()),
        }
    }

    /// Registers a business at the first stage.
    ///
    /// # Errors
    ///
    /// Returns an error when registration fails.
    pub async fn register(&self, name: &str) -> eyre::Result<PipelineEntity> {
        let entity = self
            .engine
            .registry()
            .register(
                RegisterEntityRequest {
                    kind: EntityKind::Business,
                    display_name: name.to_owned(),
                    organization_id: OrganizationId::new(),
                },
                Some(self.admin.actor()),
            )
            .await?;
        Ok(entity)
    }

    /// Lists the tasks linked to the entity at `stage`.
    ///
    /// # Errors
    ///
    /// Returns an error when listing fails.
    pub async fn stage_tasks(
        &self,
        entity_id: PipelineEntityId,
        stage: Stage,
    ) -> eyre::Result<Vec<Task>> {
        let tasks = self
            .engine
            .list_tasks(
                &self.admin,
                TaskFilter::all().for_entity(entity_id).in_stage(stage),
            )
            .await?;
        Ok(tasks)
    }

    /// Marks every blocking task of the stage done.
    ///
    /// # Errors
    ///
    /// Returns an error when listing or updating fails.
    pub async fn complete_blocking(
        &self,
        entity_id: PipelineEntityId,
        stage: Stage,
    ) -> eyre::Result<()> {
        for task in self.stage_tasks(entity_id, stage).await? {
            if task.blocks_progression() {
                self.engine
                    .update_status(&self.admin, task.id(), TaskStatus::Done)
                    .await?;
            }
        }
        Ok(())
    }
}

/// Provides an engine using the built-in catalogue and default settings.
#[fixture]
pub fn journey() -> Journey {
    Journey::with_config(&JourneyConfig::default())
}
