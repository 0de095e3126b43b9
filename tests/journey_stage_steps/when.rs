//! When steps for journey stage BDD scenarios.

use super::world::{JourneyWorld, complete_blocking, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use std::sync::Arc;

#[when("every blocking task of the current stage is marked done")]
fn mark_blocking_done(world: &mut JourneyWorld) -> Result<(), eyre::Report> {
    complete_blocking(world)
}

#[when("the business is advanced")]
fn advance(world: &mut JourneyWorld) -> Result<(), eyre::Report> {
    let entity_id = world.entity()?.id();
    let result = run_async(world.engine.advance(&world.admin, entity_id));
    world.advance_results.push(result);
    Ok(())
}

#[when("the business is advanced by {callers:usize} callers at once")]
fn advance_concurrently(world: &mut JourneyWorld, callers: usize) -> Result<(), eyre::Report> {
    let entity_id = world.entity()?.id();
    let handles: Vec<_> = (0..callers)
        .map(|_| {
            let engine = Arc::clone(&world.engine);
            let admin = world.admin.clone();
            tokio::spawn(async move { engine.advance(&admin, entity_id).await })
        })
        .collect();
    for handle in handles {
        let result = run_async(handle).wrap_err("join advance caller")?;
        world.advance_results.push(result);
    }
    Ok(())
}

#[when("calendar sync is toggled for the task")]
fn toggle_sync(world: &mut JourneyWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let status = run_async(world.engine.toggle_sync(&world.admin, task_id))
        .wrap_err("toggle calendar sync")?;
    world.sync_status = Some(status);
    Ok(())
}

#[when("the task is deleted")]
fn delete_task(world: &mut JourneyWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    world.delete_result = Some(run_async(world.engine.delete_task(&world.admin, task_id)));
    Ok(())
}
