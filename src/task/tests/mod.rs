//! Unit tests for the task bounded context.


use crate::pipeline::domain::{PipelineEntityId, Stage};
use crate::task::domain::{
    CalendarSyncStatus, PersistedTaskData, StageLink, Task, TaskCategory, TaskId, TaskOrigin,
    TaskPriority, TaskStatus,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Fixed reference instant for deterministic timestamps.
pub(super) fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Returns `epoch()` shifted by whole hours.
pub(super) fn hours(offset: i64) -> DateTime<Utc> {
    epoch() + Duration::hours(offset)
}

/// Baseline persisted data for a freeform, unlinked task.
pub(super) fn persisted(title: &str) -> PersistedTaskData {
    PersistedTaskData {
        id: TaskId::new(),
        title: title.to_owned(),
        description: None,
        status: TaskStatus::Todo,
        priority: TaskPriority::Medium,
        category: TaskCategory::General,
        due_at: None,
        assignee: None,
        link: None,
        origin: TaskOrigin::Freeform,
        blocks_progression: false,
        calendar_status: CalendarSyncStatus::Unsynced,
        calendar_error: None,
        completed_at: None,
        created_by: None,
        created_at: epoch(),
        updated_at: epoch(),
    }
}

/// Builds a task linked to `entity_id` at `stage`.
pub(super) fn linked(title: &str, entity_id: PipelineEntityId, stage: Stage) -> Task {
    Task::from_persisted(PersistedTaskData {
        link: Some(StageLink::new(entity_id, stage)),
        ..persisted(title)
    })
}
