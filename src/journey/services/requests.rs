//! Request values accepted by journey services.

use crate::pipeline::domain::{EntityKind, OrganizationId, PipelineEntityId, UserId};
use crate::task::domain::{TaskCategory, TaskPriority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fields for a user-authored task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFreeformTaskRequest {
    /// Task title; must not be blank.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Priority, `medium` when omitted.
    #[serde(default)]
    pub priority: TaskPriority,
    /// Stored category, `general` when omitted.
    #[serde(default)]
    pub category: TaskCategory,
    /// Optional due timestamp.
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    /// Optional assignee.
    #[serde(default)]
    pub assignee: Option<UserId>,
    /// Entity to link the task to, at that entity's current stage.
    #[serde(default)]
    pub entity_id: Option<PipelineEntityId>,
    /// Whether the task holds the linked stage until done.
    #[serde(default)]
    pub blocks_progression: bool,
}

impl CreateFreeformTaskRequest {
    /// Creates a request with only a title set.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the due timestamp.
    #[must_use]
    pub const fn due(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    /// Links the task to an entity.
    #[must_use]
    pub const fn linked_to(mut self, entity_id: PipelineEntityId) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    /// Marks the task as blocking its stage.
    #[must_use]
    pub const fn blocking(mut self) -> Self {
        self.blocks_progression = true;
        self
    }
}

/// Fields for recording a new business or campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterEntityRequest {
    /// Business or campaign.
    pub kind: EntityKind,
    /// Name shown to users.
    pub display_name: String,
    /// Owning organization.
    pub organization_id: OrganizationId,
}
