//! Audit entries handed to the append-only audit sink.

use crate::pipeline::domain::{PipelineEntityId, UserId};
use crate::task::domain::TaskId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record an audit entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum AuditSubject {
    /// A task.
    Task(TaskId),
    /// A pipeline entity.
    Entity(PipelineEntityId),
}

/// Kind of change recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// The subject was created.
    Created,
    /// One or more fields changed.
    Updated,
    /// The subject was deleted.
    Deleted,
    /// A pipeline entity moved to its next stage.
    StageAdvanced,
    /// A pipeline entity was deactivated.
    Deactivated,
}

/// Old and new value of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Field name.
    pub field: String,
    /// Value before the change, `None` when absent.
    pub old: Option<String>,
    /// Value after the change, `None` when absent.
    pub new: Option<String>,
}

impl FieldChange {
    /// Creates a field change.
    #[must_use]
    pub fn new(field: impl Into<String>, old: Option<String>, new: Option<String>) -> Self {
        Self {
            field: field.into(),
            old,
            new,
        }
    }

    /// Records a field that was set on creation.
    #[must_use]
    pub fn set(field: impl Into<String>, new: impl Into<String>) -> Self {
        Self::new(field, None, Some(new.into()))
    }
}

/// Field-level description of a committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Entry identifier; sinks may deduplicate on it.
    pub id: Uuid,
    /// Record the entry describes.
    pub subject: AuditSubject,
    /// Kind of change.
    pub action: AuditAction,
    /// Changed fields.
    pub changes: Vec<FieldChange>,
    /// Acting user, `None` for engine-initiated changes.
    pub actor: Option<UserId>,
    /// When the change was committed.
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Creates an entry stamped with the current clock time.
    #[must_use]
    pub fn new(
        subject: AuditSubject,
        action: AuditAction,
        changes: Vec<FieldChange>,
        actor: Option<UserId>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject,
            action,
            changes,
            actor,
            recorded_at: clock.utc(),
        }
    }
}
