//! Task aggregate root and related lifecycle types.

use super::{CalendarSyncStatus, TaskCategory, TaskDomainError, TaskId, TaskPriority, TaskStatus};
use crate::pipeline::domain::{PipelineEntityId, Stage, TaskTemplate, TemplateKey, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Linkage of a task to the pipeline entity stage it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageLink {
    /// Owning pipeline entity.
    pub entity_id: PipelineEntityId,
    /// Stage the task was created for.
    pub stage: Stage,
}

impl StageLink {
    /// Creates a stage link.
    #[must_use]
    pub const fn new(entity_id: PipelineEntityId, stage: Stage) -> Self {
        Self { entity_id, stage }
    }
}

/// How a task came into existence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskOrigin {
    /// Materialized from a stage template.
    Template {
        /// Key of the source template.
        key: TemplateKey,
    },
    /// Authored directly by a user.
    Freeform,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
    category: TaskCategory,
    due_at: Option<DateTime<Utc>>,
    assignee: Option<UserId>,
    link: Option<StageLink>,
    origin: TaskOrigin,
    blocks_progression: bool,
    calendar_status: CalendarSyncStatus,
    calendar_error: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    created_by: Option<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Field values for a user-authored task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFreeformTask {
    /// Task title; must not be blank.
    pub title: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Priority.
    pub priority: TaskPriority,
    /// Stored category.
    pub category: TaskCategory,
    /// Optional due timestamp.
    pub due_at: Option<DateTime<Utc>>,
    /// Optional assignee.
    pub assignee: Option<UserId>,
    /// Optional pipeline linkage.
    pub link: Option<StageLink>,
    /// Whether the task holds its stage until done.
    pub blocks_progression: bool,
    /// Authoring user.
    pub created_by: UserId,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Persisted category.
    pub category: TaskCategory,
    /// Persisted due timestamp.
    pub due_at: Option<DateTime<Utc>>,
    /// Persisted assignee.
    pub assignee: Option<UserId>,
    /// Persisted pipeline linkage.
    pub link: Option<StageLink>,
    /// Persisted origin.
    pub origin: TaskOrigin,
    /// Persisted blocking flag.
    pub blocks_progression: bool,
    /// Persisted calendar mirror state.
    pub calendar_status: CalendarSyncStatus,
    /// Persisted calendar error message.
    pub calendar_error: Option<String>,
    /// Persisted completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted author, `None` for generated tasks.
    pub created_by: Option<UserId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Materializes a template for the given entity.
    #[must_use]
    pub fn from_template(
        template: &TaskTemplate,
        entity_id: PipelineEntityId,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            title: template.title().to_owned(),
            description: None,
            status: TaskStatus::Todo,
            priority: template.priority(),
            category: template.category(),
            due_at: None,
            assignee: None,
            link: Some(StageLink::new(entity_id, template.stage())),
            origin: TaskOrigin::Template {
                key: template.key().clone(),
            },
            blocks_progression: template.blocks_progression(),
            calendar_status: CalendarSyncStatus::Unsynced,
            calendar_error: None,
            completed_at: None,
            created_by: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Creates a user-authored task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is blank.
    pub fn new_freeform(
        data: NewFreeformTask,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let title = data.title.trim();
        if title.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        let description = data
            .description
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());
        let timestamp = clock.utc();

        Ok(Self {
            id: TaskId::new(),
            title: title.to_owned(),
            description,
            status: TaskStatus::Todo,
            priority: data.priority,
            category: data.category,
            due_at: data.due_at,
            assignee: data.assignee,
            link: data.link,
            origin: TaskOrigin::Freeform,
            blocks_progression: data.blocks_progression,
            calendar_status: CalendarSyncStatus::Unsynced,
            calendar_error: None,
            completed_at: None,
            created_by: Some(data.created_by),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            category: data.category,
            due_at: data.due_at,
            assignee: data.assignee,
            link: data.link,
            origin: data.origin,
            blocks_progression: data.blocks_progression,
            calendar_status: data.calendar_status,
            calendar_error: data.calendar_error,
            completed_at: data.completed_at,
            created_by: data.created_by,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the work status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the stored category.
    #[must_use]
    pub const fn category(&self) -> TaskCategory {
        self.category
    }

    /// Returns the due timestamp, if scheduled.
    #[must_use]
    pub const fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee(&self) -> Option<UserId> {
        self.assignee
    }

    /// Returns the pipeline linkage, if any.
    #[must_use]
    pub const fn link(&self) -> Option<StageLink> {
        self.link
    }

    /// Returns the linked entity, if any.
    #[must_use]
    pub fn entity_id(&self) -> Option<PipelineEntityId> {
        self.link.map(|link| link.entity_id)
    }

    /// Returns the origin.
    #[must_use]
    pub const fn origin(&self) -> &TaskOrigin {
        &self.origin
    }

    /// Returns the source template key for generated tasks.
    #[must_use]
    pub const fn template_key(&self) -> Option<&TemplateKey> {
        match &self.origin {
            TaskOrigin::Template { key } => Some(key),
            TaskOrigin::Freeform => None,
        }
    }

    /// Returns `true` when the task was materialized from a template.
    #[must_use]
    pub const fn is_auto_generated(&self) -> bool {
        matches!(self.origin, TaskOrigin::Template { .. })
    }

    /// Returns the blocking flag as stored, regardless of status.
    #[must_use]
    pub const fn blocks_progression(&self) -> bool {
        self.blocks_progression
    }

    /// Returns `true` while the task holds its stage: it is flagged as
    /// blocking and not yet done.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        self.blocks_progression && !self.status.is_done()
    }

    /// Returns `true` when this task currently holds `entity_id` at `stage`.
    #[must_use]
    pub fn holds_stage(&self, entity_id: PipelineEntityId, stage: Stage) -> bool {
        self.is_blocking() && self.link == Some(StageLink::new(entity_id, stage))
    }

    /// Returns `true` when a portal user may see the task: they are the
    /// assignee or the task is linked to one of their entities.
    #[must_use]
    pub fn is_visible_to(&self, user_id: UserId, entity_ids: &BTreeSet<PipelineEntityId>) -> bool {
        self.assignee == Some(user_id)
            || self
                .entity_id()
                .is_some_and(|entity_id| entity_ids.contains(&entity_id))
    }

    /// Returns the calendar mirror state.
    #[must_use]
    pub const fn calendar_status(&self) -> CalendarSyncStatus {
        self.calendar_status
    }

    /// Returns the last calendar error, if any.
    #[must_use]
    pub fn calendar_error(&self) -> Option<&str> {
        self.calendar_error.as_deref()
    }

    /// Returns `true` when an external event currently mirrors the task.
    #[must_use]
    pub const fn is_synced(&self) -> bool {
        matches!(self.calendar_status, CalendarSyncStatus::Synced)
    }

    /// Returns `true` when the task can be mirrored: it has a due date.
    #[must_use]
    pub const fn can_sync(&self) -> bool {
        self.due_at.is_some()
    }

    /// Returns when the task was last marked done.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the author, `None` for generated tasks.
    #[must_use]
    pub const fn created_by(&self) -> Option<UserId> {
        self.created_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Sets the status, stamping `completed_at` on entering `done` and
    /// clearing it on leaving.
    ///
    /// Returns `false` when the status is unchanged.
    pub fn set_status(&mut self, status: TaskStatus, clock: &impl Clock) -> bool {
        if self.status == status {
            return false;
        }
        let timestamp = clock.utc();
        self.completed_at = status.is_done().then_some(timestamp);
        self.status = status;
        self.updated_at = timestamp;
        true
    }

    /// Sets the priority. Returns `false` when unchanged.
    pub fn set_priority(&mut self, priority: TaskPriority, clock: &impl Clock) -> bool {
        replace_field(&mut self.priority, priority, &mut self.updated_at, clock)
    }

    /// Sets or clears the assignee. Returns `false` when unchanged.
    pub fn assign(&mut self, assignee: Option<UserId>, clock: &impl Clock) -> bool {
        replace_field(&mut self.assignee, assignee, &mut self.updated_at, clock)
    }

    /// Sets or clears the due date. Returns `false` when unchanged.
    pub fn reschedule(&mut self, due_at: Option<DateTime<Utc>>, clock: &impl Clock) -> bool {
        replace_field(&mut self.due_at, due_at, &mut self.updated_at, clock)
    }

    /// Records that an external event now mirrors the task.
    pub fn record_calendar_synced(&mut self, clock: &impl Clock) {
        self.calendar_status = CalendarSyncStatus::Synced;
        self.calendar_error = None;
        self.updated_at = clock.utc();
    }

    /// Records that no external event mirrors the task any more.
    pub fn record_calendar_unsynced(&mut self, clock: &impl Clock) {
        self.calendar_status = CalendarSyncStatus::Unsynced;
        self.calendar_error = None;
        self.updated_at = clock.utc();
    }

    /// Records a failed calendar call.
    ///
    /// A synced task stays synced, since its external event still exists;
    /// otherwise the status becomes [`CalendarSyncStatus::Failed`].
    pub fn record_calendar_failure(&mut self, message: impl Into<String>, clock: &impl Clock) {
        if !self.is_synced() {
            self.calendar_status = CalendarSyncStatus::Failed;
        }
        self.calendar_error = Some(message.into());
        self.updated_at = clock.utc();
    }
}

fn replace_field<T: PartialEq>(
    field: &mut T,
    value: T,
    updated_at: &mut DateTime<Utc>,
    clock: &impl Clock,
) -> bool {
    if *field == value {
        return false;
    }
    *field = value;
    *updated_at = clock.utc();
    true
}
