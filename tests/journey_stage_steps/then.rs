//! Then steps for journey stage BDD scenarios.

use super::world::{JourneyWorld, run_async};
use journey_engine::journey::services::JourneyError;
use journey_engine::pipeline::domain::Stage;
use journey_engine::task::ports::TaskFilter;
use rstest_bdd_macros::then;
use std::collections::BTreeSet;

#[then("the business cannot advance")]
fn cannot_advance(world: &JourneyWorld) -> Result<(), eyre::Report> {
    let entity_id = world.entity()?.id();
    let allowed = run_async(world.engine.can_advance(&world.admin, entity_id))?;
    eyre::ensure!(!allowed, "business should be blocked");
    Ok(())
}

#[then("the business can advance")]
fn can_advance(world: &JourneyWorld) -> Result<(), eyre::Report> {
    let entity_id = world.entity()?.id();
    let allowed = run_async(world.engine.can_advance(&world.admin, entity_id))?;
    eyre::ensure!(allowed, "business should be free to advance");
    Ok(())
}

#[then(r#"the business is at stage "{stage}""#)]
fn business_at_stage(world: &JourneyWorld, stage: String) -> Result<(), eyre::Report> {
    let expected = Stage::try_from(stage.as_str())
        .map_err(|err| eyre::eyre!("invalid expected stage in scenario: {err}"))?;
    let reached = world
        .advance_results
        .last()
        .ok_or_else(|| eyre::eyre!("no advance attempted"))?;
    match reached {
        Ok(actual) if *actual == expected => Ok(()),
        other => Err(eyre::eyre!("expected stage {expected}, got {other:?}")),
    }
}

#[then(r#"the tasks of stage "{stage}" exist exactly once"#)]
fn stage_tasks_once(world: &JourneyWorld, stage: String) -> Result<(), eyre::Report> {
    let expected = Stage::try_from(stage.as_str())
        .map_err(|err| eyre::eyre!("invalid stage in scenario: {err}"))?;
    let entity_id = world.entity()?.id();
    let tasks = run_async(world.engine.list_tasks(
        &world.admin,
        TaskFilter::all().for_entity(entity_id).in_stage(expected),
    ))?;
    let keys: BTreeSet<String> = tasks
        .iter()
        .filter_map(|task| task.template_key().map(|key| key.as_str().to_owned()))
        .collect();
    eyre::ensure!(!keys.is_empty(), "no tasks generated for {expected}");
    eyre::ensure!(
        keys.len() == tasks.len(),
        "duplicate tasks generated for {expected}: {} tasks, {} templates",
        tasks.len(),
        keys.len()
    );
    Ok(())
}

#[then("exactly one advance succeeds")]
fn one_advance_succeeds(world: &JourneyWorld) -> Result<(), eyre::Report> {
    let succeeded = world
        .advance_results
        .iter()
        .filter(|result| result.is_ok())
        .count();
    eyre::ensure!(succeeded == 1, "expected one success, got {succeeded}");
    let unexpected: Vec<_> = world
        .advance_results
        .iter()
        .filter(|result| {
            !matches!(
                result,
                Ok(Stage::Scheduling)
                    | Err(JourneyError::StageBlocked { .. } | JourneyError::EntityBusy(_))
            )
        })
        .collect();
    eyre::ensure!(unexpected.is_empty(), "unexpected outcomes {unexpected:?}");
    Ok(())
}

#[then("the task reports that it cannot sync")]
fn cannot_sync(world: &JourneyWorld) -> Result<(), eyre::Report> {
    let status = world
        .sync_status
        .as_ref()
        .ok_or_else(|| eyre::eyre!("sync was not toggled"))?;
    eyre::ensure!(
        !status.can_sync && !status.is_synced && status.sync_error.is_none(),
        "unexpected sync status {status:?}"
    );
    Ok(())
}

#[then("the calendar was never called")]
fn calendar_untouched(world: &JourneyWorld) -> Result<(), eyre::Report> {
    let calls = world.calendar.call_count();
    eyre::ensure!(calls == 0, "calendar called {calls} time(s)");
    Ok(())
}

#[then("the deletion succeeds")]
fn deletion_succeeds(world: &JourneyWorld) -> Result<(), eyre::Report> {
    match &world.delete_result {
        Some(Ok(())) => Ok(()),
        other => Err(eyre::eyre!("expected successful deletion, got {other:?}")),
    }
}

#[then("the task no longer appears in the task list")]
fn task_gone(world: &JourneyWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let tasks = run_async(world.engine.list_tasks(&world.admin, TaskFilter::all()))?;
    eyre::ensure!(
        tasks.iter().all(|task| task.id() != task_id),
        "deleted task still listed"
    );
    Ok(())
}
