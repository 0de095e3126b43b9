//! Query values accepted by [`super::TaskRepository::list`].

use crate::pipeline::domain::{PipelineEntityId, Stage, UserId};
use crate::task::domain::{Task, TaskStatus};
use std::collections::BTreeSet;

/// Caller-supplied narrowing of a task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Only tasks assigned to this user.
    pub assignee: Option<UserId>,
    /// Only tasks in this status.
    pub status: Option<TaskStatus>,
    /// Only tasks linked to this entity.
    pub entity_id: Option<PipelineEntityId>,
    /// Only tasks linked to this stage.
    pub stage: Option<Stage>,
}

impl TaskFilter {
    /// Creates a filter that matches every task.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts to one assignee.
    #[must_use]
    pub const fn assigned_to(mut self, user_id: UserId) -> Self {
        self.assignee = Some(user_id);
        self
    }

    /// Restricts to one status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts to one pipeline entity.
    #[must_use]
    pub const fn for_entity(mut self, entity_id: PipelineEntityId) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    /// Restricts to one stage.
    #[must_use]
    pub const fn in_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Returns `true` when `task` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.assignee.is_none_or(|user_id| task.assignee() == Some(user_id))
            && self.status.is_none_or(|status| task.status() == status)
            && self
                .entity_id
                .is_none_or(|entity_id| task.entity_id() == Some(entity_id))
            && self
                .stage
                .is_none_or(|stage| task.link().is_some_and(|link| link.stage == stage))
    }
}

/// Mandatory portal narrowing: tasks the user is assigned to or that are
/// linked to one of their entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskVisibility {
    /// Portal user.
    pub user_id: UserId,
    /// Entities the user is linked to.
    pub entity_ids: BTreeSet<PipelineEntityId>,
}

impl TaskVisibility {
    /// Returns `true` when `task` is visible under this scope.
    #[must_use]
    pub fn permits(&self, task: &Task) -> bool {
        task.is_visible_to(self.user_id, &self.entity_ids)
    }
}

/// Complete repository query: an optional visibility scope applied before
/// the caller's filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    visibility: Option<TaskVisibility>,
    filter: TaskFilter,
}

impl TaskQuery {
    /// Creates an unscoped query from a caller filter.
    #[must_use]
    pub const fn new(filter: TaskFilter) -> Self {
        Self {
            visibility: None,
            filter,
        }
    }

    /// Applies a visibility scope.
    #[must_use]
    pub fn scoped(mut self, visibility: Option<TaskVisibility>) -> Self {
        self.visibility = visibility;
        self
    }

    /// Returns the visibility scope, if any.
    #[must_use]
    pub const fn visibility(&self) -> Option<&TaskVisibility> {
        self.visibility.as_ref()
    }

    /// Returns the caller filter.
    #[must_use]
    pub const fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    /// Returns `true` when `task` passes both the scope and the filter.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.visibility
            .as_ref()
            .is_none_or(|visibility| visibility.permits(task))
            && self.filter.matches(task)
    }
}
