//! Unit tests for the journey services.


use crate::config::JourneyConfig;
use crate::journey::{
    adapters::{
        SurfacePolicy,
        memory::{InMemoryAuditLog, InMemoryCalendar},
    },
    domain::Caller,
    services::{JourneyPorts, RegisterEntityRequest, TaskCoordinator},
};
use crate::pipeline::{
    adapters::memory::InMemoryPipelineEntityRepository,
    domain::{
        EntityKind, OrganizationId, PipelineEntity, PipelineEntityId, Stage, StageCatalogue,
        TaskTemplate, TemplateKey, UserId,
    },
};
use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Task, TaskPriority, TaskStatus},
    ports::TaskRepository,
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

pub(super) type TestCoordinator = TaskCoordinator<
    InMemoryTaskRepository,
    InMemoryPipelineEntityRepository,
    InMemoryCalendar,
    InMemoryAuditLog,
    DefaultClock,
>;

/// Coordinator wired to in-memory adapters, with handles on each adapter.
pub(super) struct Harness {
    pub(super) coordinator: TestCoordinator,
    pub(super) tasks: Arc<InMemoryTaskRepository>,
    pub(super) entities: Arc<InMemoryPipelineEntityRepository>,
    pub(super) calendar: Arc<InMemoryCalendar>,
    pub(super) audit: Arc<InMemoryAuditLog>,
    pub(super) admin: Caller,
}

impl Harness {
    pub(super) fn build(config: &JourneyConfig, catalogue: StageCatalogue) -> Self {
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let entities = Arc::new(InMemoryPipelineEntityRepository::new());
        let calendar = Arc::new(InMemoryCalendar::new());
        let audit = Arc::new(InMemoryAuditLog::new());
        let coordinator = TaskCoordinator::new(
            JourneyPorts {
                tasks: Arc::clone(&tasks),
                entities: Arc::clone(&entities),
                calendar: Arc::clone(&calendar),
                audit: Arc::clone(&audit),
                policy: Arc::new(SurfacePolicy::new(config.portal_may_create_tasks)),
            },
            catalogue,
            config,
            Arc::new(DefaultClock),
        );
        Self {
            coordinator,
            tasks,
            entities,
            calendar,
            audit,
            admin: Caller::admin(UserId::new()),
        }
    }

    /// Portal caller linked to the given entities.
    pub(super) fn portal(entities: impl IntoIterator<Item = PipelineEntityId>) -> Caller {
        Caller::portal(UserId::new(), entities)
    }

    pub(super) async fn register(&self, name: &str) -> PipelineEntity {
        self.coordinator
            .registry()
            .register(
                RegisterEntityRequest {
                    kind: EntityKind::Business,
                    display_name: name.to_owned(),
                    organization_id: OrganizationId::new(),
                },
                Some(self.admin.actor()),
            )
            .await
            .expect("registration succeeds")
    }

    pub(super) async fn stage_tasks(&self, entity_id: PipelineEntityId, stage: Stage) -> Vec<Task> {
        self.tasks
            .find_by_stage(entity_id, stage)
            .await
            .expect("stage lookup succeeds")
    }

    /// Marks every blocking task of the stage done through the coordinator.
    pub(super) async fn complete_blocking(&self, entity_id: PipelineEntityId, stage: Stage) {
        for task in self.stage_tasks(entity_id, stage).await {
            if task.blocks_progression() {
                self.coordinator
                    .update_status(&self.admin, task.id(), TaskStatus::Done)
                    .await
                    .expect("status update succeeds");
            }
        }
    }
}

fn template(key: &str, stage: Stage, blocking: bool) -> TaskTemplate {
    TaskTemplate::new(
        TemplateKey::new(key).expect("valid key"),
        stage,
        format!("Template {key}"),
        TaskPriority::Medium,
    )
    .expect("valid template")
    .blocking(blocking)
}

/// Two briefing templates (one blocking) and one blocking scheduling
/// template.
pub(super) fn small_catalogue() -> StageCatalogue {
    StageCatalogue::new([
        template("briefing.sign_off", Stage::Briefing, true),
        template("briefing.optional", Stage::Briefing, false),
        template("scheduling.book", Stage::Scheduling, true),
    ])
    .expect("valid catalogue")
}

#[fixture]
pub(super) fn harness() -> Harness {
    Harness::build(&JourneyConfig::default(), small_catalogue())
}
