//! End-to-end stage progression through the coordinator.

use super::helpers::{Journey, journey};
use journey_engine::journey::{
    domain::{AuditAction, AuditSubject, Caller},
    services::JourneyError,
};
use journey_engine::pipeline::domain::{Stage, UserId};
use journey_engine::task::{domain::TaskStatus, ports::TaskFilter};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blocking_tasks_gate_the_first_advance(journey: Journey) -> eyre::Result<()> {
    let entity = journey.register("Harbour Bakery").await?;
    let briefing = journey.stage_tasks(entity.id(), Stage::Briefing).await?;
    eyre::ensure!(briefing.len() == 3, "expected 3 briefing tasks, got {}", briefing.len());
    eyre::ensure!(
        !journey.engine.can_advance(&journey.admin, entity.id()).await?,
        "fresh entity should be blocked"
    );

    let blocking = journey
        .engine
        .blocking_tasks(&journey.admin, entity.id())
        .await?;
    eyre::ensure!(blocking.len() == 2, "expected 2 blockers, got {blocking:?}");

    journey.complete_blocking(entity.id(), Stage::Briefing).await?;
    eyre::ensure!(
        journey.engine.can_advance(&journey.admin, entity.id()).await?,
        "completed blockers should release the stage"
    );

    let next = journey.engine.advance(&journey.admin, entity.id()).await?;
    eyre::ensure!(next == Stage::Scheduling, "advanced to {next}");

    let scheduling = journey.stage_tasks(entity.id(), Stage::Scheduling).await?;
    let mut keys: Vec<String> = scheduling
        .iter()
        .filter_map(|task| task.template_key().map(|key| key.as_str().to_owned()))
        .collect();
    keys.sort();
    eyre::ensure!(
        keys == [
            "scheduling.book_visit",
            "scheduling.confirm_business",
            "scheduling.remind_creator",
        ],
        "unexpected scheduling templates {keys:?}"
    );
    eyre::ensure!(
        !journey.engine.can_advance(&journey.admin, entity.id()).await?,
        "new stage should start blocked"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn walks_the_whole_pipeline(journey: Journey) -> eyre::Result<()> {
    let entity = journey.register("Corner Cafe").await?;

    for expected in [Stage::Scheduling, Stage::FinalDelivery, Stage::Completed] {
        let current = Stage::ALL
            .into_iter()
            .find(|stage| stage.next() == Some(expected))
            .ok_or_else(|| eyre::eyre!("no stage precedes {expected}"))?;
        journey.complete_blocking(entity.id(), current).await?;
        let reached = journey.engine.advance(&journey.admin, entity.id()).await?;
        eyre::ensure!(reached == expected, "expected {expected}, reached {reached}");
    }

    eyre::ensure!(
        journey.stage_tasks(entity.id(), Stage::Completed).await?.is_empty(),
        "terminal stage materialized tasks"
    );
    let again = journey.engine.advance(&journey.admin, entity.id()).await;
    eyre::ensure!(
        matches!(again, Err(JourneyError::AlreadyTerminal(id)) if id == entity.id()),
        "expected AlreadyTerminal, got {again:?}"
    );

    let advances = journey
        .audit
        .entries_for(AuditSubject::Entity(entity.id()))
        .into_iter()
        .filter(|entry| entry.action == AuditAction::StageAdvanced)
        .count();
    eyre::ensure!(advances == 3, "expected 3 stage transitions audited, got {advances}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reopened_tasks_block_again(journey: Journey) -> eyre::Result<()> {
    let entity = journey.register("Corner Cafe").await?;
    journey.complete_blocking(entity.id(), Stage::Briefing).await?;
    eyre::ensure!(
        journey.engine.can_advance(&journey.admin, entity.id()).await?,
        "stage should be free"
    );

    let done = journey
        .engine
        .list_tasks(
            &journey.admin,
            TaskFilter::all()
                .for_entity(entity.id())
                .with_status(TaskStatus::Done),
        )
        .await?;
    let reopened = done
        .first()
        .ok_or_else(|| eyre::eyre!("no completed task"))?;
    journey
        .engine
        .update_status(&journey.admin, reopened.id(), TaskStatus::Review)
        .await?;

    let result = journey.engine.advance(&journey.admin, entity.id()).await;
    match result {
        Err(JourneyError::StageBlocked { stage, blocking, .. }) => {
            eyre::ensure!(stage == Stage::Briefing, "blocked at {stage}");
            eyre::ensure!(
                blocking.iter().map(|task| task.id).eq([reopened.id()]),
                "unexpected blockers {blocking:?}"
            );
        }
        other => eyre::bail!("expected StageBlocked, got {other:?}"),
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn portal_sees_only_its_own_journey(journey: Journey) -> eyre::Result<()> {
    let own = journey.register("Own venue").await?;
    let other = journey.register("Other venue").await?;
    let portal = Caller::portal(UserId::new(), [own.id()]);

    let visible = journey.engine.list_tasks(&portal, TaskFilter::all()).await?;
    eyre::ensure!(
        visible.iter().all(|task| task.entity_id() == Some(own.id())),
        "foreign tasks visible to portal"
    );
    eyre::ensure!(
        !journey.engine.can_advance(&portal, own.id()).await?,
        "portal may inspect its own entity"
    );
    let foreign = journey.engine.can_advance(&portal, other.id()).await;
    eyre::ensure!(
        matches!(foreign, Err(JourneyError::EntityNotFound(_))),
        "foreign entity should look missing, got {foreign:?}"
    );
    Ok(())
}
