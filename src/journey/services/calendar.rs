//! Calendar reconciliation: bounded, best-effort mirroring of scheduled
//! tasks into the external calendar.

use crate::journey::{
    domain::SyncStatusView,
    ports::{CalendarError, CalendarGateway, CalendarResult},
};
use crate::task::domain::{Task, TaskId};
use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Result of one calendar call, to be recorded on the task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarOutcome {
    /// An external event now mirrors the task.
    Synced,
    /// No external event mirrors the task.
    Unsynced,
    /// The call failed with the given message.
    Failed(String),
}

impl CalendarOutcome {
    /// Records the outcome on `task`.
    pub fn apply(&self, task: &mut Task, clock: &impl Clock) {
        match self {
            Self::Synced => task.record_calendar_synced(clock),
            Self::Unsynced => task.record_calendar_unsynced(clock),
            Self::Failed(message) => task.record_calendar_failure(message.as_str(), clock),
        }
    }
}

/// Issues calendar calls under a timeout and turns failures into
/// [`CalendarOutcome::Failed`] instead of errors.
///
/// The reconciler never touches storage; callers record the outcome on a
/// freshly loaded task and persist it.
pub struct CalendarReconciler<G: CalendarGateway> {
    gateway: Arc<G>,
    timeout: Duration,
}

impl<G: CalendarGateway> CalendarReconciler<G> {
    /// Creates a reconciler bounding every call by `timeout`.
    #[must_use]
    pub const fn new(gateway: Arc<G>, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    /// Reports the task's calendar state.
    #[must_use]
    pub fn sync_status(task: &Task) -> SyncStatusView {
        SyncStatusView::from(task)
    }

    /// Flips calendar mirroring for the task.
    ///
    /// Returns `None` without calling the calendar when the task has no due
    /// date.
    pub async fn toggle(&self, task: &Task) -> Option<CalendarOutcome> {
        if !task.can_sync() {
            debug!(task_id = %task.id(), "task has no due date; not mirrored");
            return None;
        }
        let outcome = if task.is_synced() {
            self.remove(task.id()).await
        } else {
            self.push(task).await
        };
        Some(outcome)
    }

    /// Creates or refreshes the external event.
    pub async fn push(&self, task: &Task) -> CalendarOutcome {
        let result = self.bounded(self.gateway.push_event(task)).await;
        Self::outcome(task.id(), result, CalendarOutcome::Synced)
    }

    /// Removes the external event.
    pub async fn remove(&self, task_id: TaskId) -> CalendarOutcome {
        let result = self.bounded(self.gateway.remove_event(task_id)).await;
        Self::outcome(task_id, result, CalendarOutcome::Unsynced)
    }

    async fn bounded(
        &self,
        call: impl Future<Output = CalendarResult<()>> + Send,
    ) -> CalendarResult<()> {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or(Err(CalendarError::Timeout(self.timeout)))
    }

    fn outcome(
        task_id: TaskId,
        result: CalendarResult<()>,
        success: CalendarOutcome,
    ) -> CalendarOutcome {
        match result {
            Ok(()) => success,
            Err(err) => {
                warn!(%task_id, error = %err, "calendar call failed");
                CalendarOutcome::Failed(err.to_string())
            }
        }
    }
}
