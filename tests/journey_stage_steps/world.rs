//! Shared world state for journey stage BDD scenarios.

use std::sync::Arc;

use journey_engine::config::JourneyConfig;
use journey_engine::journey::{
    adapters::{
        SurfacePolicy,
        memory::{InMemoryAuditLog, InMemoryCalendar},
    },
    domain::{Caller, SyncStatusView},
    services::{JourneyError, JourneyPorts, TaskCoordinator},
};
use journey_engine::pipeline::{
    adapters::memory::InMemoryPipelineEntityRepository,
    domain::{PipelineEntity, Stage, StageCatalogue, UserId},
};
use journey_engine::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Task, TaskStatus},
};
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest::fixture;

/// Coordinator type used by the BDD world.
pub type TestEngine = TaskCoordinator<
    InMemoryTaskRepository,
    InMemoryPipelineEntityRepository,
    InMemoryCalendar,
    InMemoryAuditLog,
    DefaultClock,
>;

/// Scenario world for journey stage behaviour tests.
pub struct JourneyWorld {
    pub engine: Arc<TestEngine>,
    pub calendar: Arc<InMemoryCalendar>,
    pub admin: Caller,
    pub entity: Option<PipelineEntity>,
    pub task: Option<Task>,
    pub advance_results: Vec<Result<Stage, JourneyError>>,
    pub sync_status: Option<SyncStatusView>,
    pub delete_result: Option<Result<(), JourneyError>>,
}

impl JourneyWorld {
    /// Creates a world around the built-in catalogue.
    #[must_use]
    pub fn new() -> Self {
        let calendar = Arc::new(InMemoryCalendar::new());
        let engine = TaskCoordinator::new(
            JourneyPorts {
                tasks: Arc::new(InMemoryTaskRepository::new()),
                entities: Arc::new(InMemoryPipelineEntityRepository::new()),
                calendar: Arc::clone(&calendar),
                audit: Arc::new(InMemoryAuditLog::new()),
                policy: Arc::new(SurfacePolicy::default()),
            },
            StageCatalogue::builtin(),
            &JourneyConfig::default(),
            Arc::new(DefaultClock),
        );
        Self {
            engine: Arc::new(engine),
            calendar,
            admin: Caller::admin(UserId::new()),
            entity: None,
            task: None,
            advance_results: Vec::new(),
            sync_status: None,
            delete_result: None,
        }
    }

    /// Returns the registered business.
    ///
    /// # Errors
    ///
    /// Returns an error when no business has been registered yet.
    pub fn entity(&self) -> Result<&PipelineEntity, eyre::Report> {
        self.entity
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing registered business in scenario world"))
    }

    /// Returns the scenario's task.
    ///
    /// # Errors
    ///
    /// Returns an error when no task has been created yet.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }
}

impl Default for JourneyWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> JourneyWorld {
    JourneyWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Marks every task holding the business at its current stage done.
///
/// # Errors
///
/// Returns an error when no business is registered or an update fails.
pub fn complete_blocking(world: &JourneyWorld) -> Result<(), eyre::Report> {
    let entity_id = world.entity()?.id();
    let blocking = run_async(world.engine.blocking_tasks(&world.admin, entity_id))
        .wrap_err("list blocking tasks")?;
    eyre::ensure!(!blocking.is_empty(), "stage has no blocking tasks");
    for task in blocking {
        run_async(
            world
                .engine
                .update_status(&world.admin, task.id, TaskStatus::Done),
        )
        .wrap_err("complete blocking task")?;
    }
    Ok(())
}
