//! Explicit caller scope passed into every coordinator operation.

use crate::pipeline::domain::{PipelineEntityId, UserId};
use crate::task::ports::TaskVisibility;
use std::collections::BTreeSet;

/// Consumer surface a request arrives from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Surface {
    /// Internal admin dashboard; sees every task.
    Admin,
    /// Creator-facing portal; sees only its own tasks.
    Portal {
        /// Entities the portal user is linked to.
        linked_entities: BTreeSet<PipelineEntityId>,
    },
}

/// Operation a caller asks to perform, checked against a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// List and read tasks.
    ReadTasks,
    /// Create a freeform task.
    CreateTask,
    /// Change a task's status.
    UpdateStatus,
    /// Change priority, assignee or due date.
    EditTask,
    /// Delete a task.
    DeleteTask,
    /// Toggle calendar mirroring.
    ToggleCalendarSync,
    /// Query whether an entity may advance.
    InspectProgress,
    /// Advance an entity to its next stage.
    AdvanceStage,
}

/// The acting user plus the surface they act through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    actor: UserId,
    surface: Surface,
}

impl Caller {
    /// Creates an admin caller.
    #[must_use]
    pub const fn admin(actor: UserId) -> Self {
        Self {
            actor,
            surface: Surface::Admin,
        }
    }

    /// Creates a portal caller linked to the given entities.
    #[must_use]
    pub fn portal(
        actor: UserId,
        linked_entities: impl IntoIterator<Item = PipelineEntityId>,
    ) -> Self {
        Self {
            actor,
            surface: Surface::Portal {
                linked_entities: linked_entities.into_iter().collect(),
            },
        }
    }

    /// Returns the acting user.
    #[must_use]
    pub const fn actor(&self) -> UserId {
        self.actor
    }

    /// Returns the surface.
    #[must_use]
    pub const fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Returns `true` for portal callers.
    #[must_use]
    pub const fn is_portal(&self) -> bool {
        matches!(self.surface, Surface::Portal { .. })
    }

    /// Returns the mandatory visibility scope, `None` for admins.
    #[must_use]
    pub fn visibility(&self) -> Option<TaskVisibility> {
        match &self.surface {
            Surface::Admin => None,
            Surface::Portal { linked_entities } => Some(TaskVisibility {
                user_id: self.actor,
                entity_ids: linked_entities.clone(),
            }),
        }
    }

    /// Returns `true` when the caller may link tasks to `entity_id`.
    #[must_use]
    pub fn owns_entity(&self, entity_id: PipelineEntityId) -> bool {
        match &self.surface {
            Surface::Admin => true,
            Surface::Portal { linked_entities } => linked_entities.contains(&entity_id),
        }
    }
}
