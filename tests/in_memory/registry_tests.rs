//! Entity registration and deactivation.

use super::helpers::{Journey, journey};
use journey_engine::journey::{
    domain::{AuditAction, AuditSubject, FieldChange},
    services::{CreateFreeformTaskRequest, JourneyError, RegisterEntityRequest},
};
use journey_engine::pipeline::domain::{EntityKind, OrganizationId, Stage};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registration_materializes_the_first_stage(journey: Journey) -> eyre::Result<()> {
    let entity = journey.register("  Harbour Bakery ").await?;

    eyre::ensure!(entity.stage() == Stage::Briefing, "registered at {}", entity.stage());
    eyre::ensure!(entity.display_name() == "Harbour Bakery", "name not trimmed");
    eyre::ensure!(entity.is_active(), "new entity inactive");

    let tasks = journey.stage_tasks(entity.id(), Stage::Briefing).await?;
    eyre::ensure!(
        tasks.iter().all(|task| task.is_auto_generated()),
        "registration created freeform tasks"
    );
    let entries = journey.audit.entries_for(AuditSubject::Entity(entity.id()));
    eyre::ensure!(
        entries.iter().any(|entry| entry.action == AuditAction::Created
            && entry.changes.contains(&FieldChange::set("stage", "briefing"))),
        "registration not audited: {entries:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_names_are_rejected(journey: Journey) -> eyre::Result<()> {
    let result = journey
        .engine
        .registry()
        .register(
            RegisterEntityRequest {
                kind: EntityKind::Campaign,
                display_name: " ".to_owned(),
                organization_id: OrganizationId::new(),
            },
            None,
        )
        .await;

    eyre::ensure!(
        matches!(result, Err(JourneyError::Pipeline(_))),
        "expected a pipeline domain error, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deactivated_entities_are_frozen(journey: Journey) -> eyre::Result<()> {
    let entity = journey.register("Harbour Bakery").await?;
    journey.complete_blocking(entity.id(), Stage::Briefing).await?;
    let registry = journey.engine.registry();

    let deactivated = registry
        .deactivate(entity.id(), Some(journey.admin.actor()))
        .await?;
    eyre::ensure!(!deactivated.is_active(), "entity still active");
    registry
        .deactivate(entity.id(), Some(journey.admin.actor()))
        .await?;

    let advance = journey.engine.advance(&journey.admin, entity.id()).await;
    eyre::ensure!(
        matches!(advance, Err(JourneyError::EntityInactive(id)) if id == entity.id()),
        "inactive entity advanced: {advance:?}"
    );
    let create = journey
        .engine
        .create_freeform(
            &journey.admin,
            CreateFreeformTaskRequest::titled("Late idea").linked_to(entity.id()),
        )
        .await;
    eyre::ensure!(
        matches!(create, Err(JourneyError::EntityInactive(_))),
        "task linked to inactive entity: {create:?}"
    );

    let deactivations = journey
        .audit
        .entries_for(AuditSubject::Entity(entity.id()))
        .into_iter()
        .filter(|entry| entry.action == AuditAction::Deactivated)
        .count();
    eyre::ensure!(deactivations == 1, "repeat deactivation audited");
    Ok(())
}
