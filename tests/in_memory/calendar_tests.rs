//! Calendar mirroring through the coordinator.

use super::helpers::{Journey, journey};
use chrono::{Duration, Utc};
use journey_engine::journey::services::CreateFreeformTaskRequest;
use journey_engine::task::{domain::CalendarSyncStatus, ports::TaskFilter};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn undated_tasks_report_cannot_sync(journey: Journey) -> eyre::Result<()> {
    let task = journey
        .engine
        .create_freeform(&journey.admin, CreateFreeformTaskRequest::titled("Loose end"))
        .await?;

    let status = journey.engine.toggle_sync(&journey.admin, task.id()).await?;

    eyre::ensure!(!status.can_sync, "undated task claims it can sync");
    let stored = journey.engine.get_task(&journey.admin, task.id()).await?;
    eyre::ensure!(
        stored.calendar_status() == task.calendar_status()
            && stored.calendar_error() == task.calendar_error()
            && stored.updated_at() == task.updated_at(),
        "calendar fields changed on an undated task"
    );
    eyre::ensure!(journey.calendar.call_count() == 0, "calendar was called");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_synced_task_ignores_calendar_failure(journey: Journey) -> eyre::Result<()> {
    let task = journey
        .engine
        .create_freeform(
            &journey.admin,
            CreateFreeformTaskRequest::titled("Venue walkthrough")
                .due(Utc::now() + Duration::days(2)),
        )
        .await?;
    let synced = journey.engine.toggle_sync(&journey.admin, task.id()).await?;
    eyre::ensure!(synced.is_synced, "task should be mirrored");

    journey.calendar.set_unreachable("connection reset");
    journey.engine.delete_task(&journey.admin, task.id()).await?;

    let listed = journey
        .engine
        .list_tasks(&journey.admin, TaskFilter::all())
        .await?;
    eyre::ensure!(
        listed.iter().all(|listed| listed.id() != task.id()),
        "deleted task still listed"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_pushes_are_reported_not_raised(journey: Journey) -> eyre::Result<()> {
    let task = journey
        .engine
        .create_freeform(
            &journey.admin,
            CreateFreeformTaskRequest::titled("Venue walkthrough")
                .due(Utc::now() + Duration::days(2)),
        )
        .await?;
    journey.calendar.set_unreachable("connection reset");

    let status = journey.engine.toggle_sync(&journey.admin, task.id()).await?;
    let reported = journey.engine.sync_status(&journey.admin, task.id()).await?;

    eyre::ensure!(status == reported, "toggle and status disagree");
    eyre::ensure!(!status.is_synced, "failed push reported as synced");
    eyre::ensure!(status.sync_error.is_some(), "failure not reported");
    let stored = journey.engine.get_task(&journey.admin, task.id()).await?;
    eyre::ensure!(
        stored.calendar_status() == CalendarSyncStatus::Failed,
        "failure not stored"
    );
    Ok(())
}
