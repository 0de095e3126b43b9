//! Given steps for journey stage BDD scenarios.

use super::world::{JourneyWorld, complete_blocking, run_async};
use chrono::{Duration, Utc};
use eyre::WrapErr;
use journey_engine::journey::services::{CreateFreeformTaskRequest, RegisterEntityRequest};
use journey_engine::pipeline::domain::{EntityKind, OrganizationId};
use rstest_bdd_macros::given;

#[given(r#"a business "{name}" registered at the briefing stage"#)]
fn registered_business(world: &mut JourneyWorld, name: String) -> Result<(), eyre::Report> {
    let entity = run_async(world.engine.registry().register(
        RegisterEntityRequest {
            kind: EntityKind::Business,
            display_name: name,
            organization_id: OrganizationId::new(),
        },
        Some(world.admin.actor()),
    ))
    .wrap_err("register business for scenario")?;
    world.entity = Some(entity);
    Ok(())
}

#[given("every blocking task of the current stage is marked done")]
fn blocking_tasks_done(world: &mut JourneyWorld) -> Result<(), eyre::Report> {
    complete_blocking(world)
}

#[given(r#"a freeform task "{title}" without a due date"#)]
fn undated_task(world: &mut JourneyWorld, title: String) -> Result<(), eyre::Report> {
    let task = run_async(
        world
            .engine
            .create_freeform(&world.admin, CreateFreeformTaskRequest::titled(title)),
    )
    .wrap_err("create undated task")?;
    world.task = Some(task);
    Ok(())
}

#[given(r#"a freeform task "{title}" due in {days:i64} days"#)]
fn dated_task(world: &mut JourneyWorld, title: String, days: i64) -> Result<(), eyre::Report> {
    let request = CreateFreeformTaskRequest::titled(title).due(Utc::now() + Duration::days(days));
    let task = run_async(world.engine.create_freeform(&world.admin, request))
        .wrap_err("create dated task")?;
    world.task = Some(task);
    Ok(())
}

#[given("the task is mirrored to the calendar")]
fn task_mirrored(world: &mut JourneyWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let status = run_async(world.engine.toggle_sync(&world.admin, task_id))
        .wrap_err("mirror task")?;
    eyre::ensure!(status.is_synced, "task was not mirrored: {status:?}");
    Ok(())
}

#[given("the calendar is unreachable")]
fn calendar_unreachable(world: &mut JourneyWorld) {
    world.calendar.set_unreachable("connection reset by peer");
}
