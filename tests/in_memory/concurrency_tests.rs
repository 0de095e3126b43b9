//! Racing writers against one pipeline entity.

use super::helpers::{Journey, journey};
use journey_engine::journey::services::JourneyError;
use journey_engine::pipeline::domain::Stage;
use journey_engine::task::domain::TaskStatus;
use rstest::rstest;
use std::sync::Arc;
use tokio::task::JoinSet;

const RACERS: usize = 8;

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_advances_move_the_entity_once(journey: Journey) -> eyre::Result<()> {
    let entity = journey.register("Harbour Bakery").await?;
    journey.complete_blocking(entity.id(), Stage::Briefing).await?;

    let mut racers = JoinSet::new();
    for _ in 0..RACERS {
        let engine = Arc::clone(&journey.engine);
        let admin = journey.admin.clone();
        let entity_id = entity.id();
        racers.spawn(async move { engine.advance(&admin, entity_id).await });
    }

    let mut advanced = 0;
    while let Some(joined) = racers.join_next().await {
        match joined? {
            Ok(stage) => {
                eyre::ensure!(stage == Stage::Scheduling, "advanced to {stage}");
                advanced += 1;
            }
            Err(JourneyError::StageBlocked { stage, .. }) => {
                eyre::ensure!(stage == Stage::Scheduling, "blocked at {stage}");
            }
            Err(JourneyError::EntityBusy(_)) => {}
            Err(other) => eyre::bail!("unexpected error {other:?}"),
        }
    }

    eyre::ensure!(advanced == 1, "expected one advance, got {advanced}");
    let scheduling = journey.stage_tasks(entity.id(), Stage::Scheduling).await?;
    eyre::ensure!(
        scheduling.len() == 3,
        "expected one set of scheduling tasks, got {}",
        scheduling.len()
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_generation_creates_one_set(journey: Journey) -> eyre::Result<()> {
    let entity = journey.register("Harbour Bakery").await?;

    let mut racers = JoinSet::new();
    for _ in 0..RACERS {
        let engine = Arc::clone(&journey.engine);
        let entity_id = entity.id();
        racers.spawn(async move {
            engine
                .ensure_tasks_for_stage(entity_id, Stage::Briefing)
                .await
        });
    }

    let mut created = 0;
    while let Some(joined) = racers.join_next().await {
        match joined? {
            Ok(count) => created += count,
            Err(JourneyError::EntityBusy(_)) => {}
            Err(other) => eyre::bail!("unexpected error {other:?}"),
        }
    }

    eyre::ensure!(created == 0, "registration already materialized the stage");
    let briefing = journey.stage_tasks(entity.id(), Stage::Briefing).await?;
    eyre::ensure!(briefing.len() == 3, "duplicates created: {}", briefing.len());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn completing_the_last_blocker_while_advancing(journey: Journey) -> eyre::Result<()> {
    let entity = journey.register("Harbour Bakery").await?;
    let blockers: Vec<_> = journey
        .stage_tasks(entity.id(), Stage::Briefing)
        .await?
        .into_iter()
        .filter(|task| task.blocks_progression())
        .collect();
    let (last, rest) = blockers
        .split_last()
        .ok_or_else(|| eyre::eyre!("no blocking tasks"))?;
    for task in rest {
        journey
            .engine
            .update_status(&journey.admin, task.id(), TaskStatus::Done)
            .await?;
    }

    let completer = {
        let engine = Arc::clone(&journey.engine);
        let admin = journey.admin.clone();
        let task_id = last.id();
        tokio::spawn(async move {
            engine
                .update_status(&admin, task_id, TaskStatus::Done)
                .await
        })
    };
    let first = journey.engine.advance(&journey.admin, entity.id()).await;
    completer.await??;

    match first {
        Ok(stage) => eyre::ensure!(stage == Stage::Scheduling, "advanced to {stage}"),
        Err(JourneyError::StageBlocked { .. } | JourneyError::EntityBusy(_)) => {
            let stage = journey.engine.advance(&journey.admin, entity.id()).await?;
            eyre::ensure!(stage == Stage::Scheduling, "retry advanced to {stage}");
        }
        Err(other) => eyre::bail!("unexpected error {other:?}"),
    }
    Ok(())
}
