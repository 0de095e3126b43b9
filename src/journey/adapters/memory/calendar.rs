//! In-memory calendar adapter.

use crate::journey::ports::{CalendarError, CalendarGateway, CalendarResult};
use crate::task::domain::{Task, TaskId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Calendar that keeps events in memory and can be switched unreachable.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCalendar {
    state: Arc<RwLock<CalendarState>>,
}

#[derive(Debug, Default)]
struct CalendarState {
    events: HashMap<TaskId, DateTime<Utc>>,
    unreachable: Option<String>,
    calls: usize,
}

impl InMemoryCalendar {
    /// Creates an empty calendar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with the given message.
    pub fn set_unreachable(&self, message: impl Into<String>) {
        self.write_state().unreachable = Some(message.into());
    }

    /// Restores normal operation.
    pub fn set_reachable(&self) {
        self.write_state().unreachable = None;
    }

    /// Returns the scheduled time of the event mirroring `task_id`.
    #[must_use]
    pub fn event_for(&self, task_id: TaskId) -> Option<DateTime<Utc>> {
        self.read_state().events.get(&task_id).copied()
    }

    /// Returns how many push/remove calls reached the calendar.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.read_state().calls
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, CalendarState> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, CalendarState> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl CalendarGateway for InMemoryCalendar {
    async fn push_event(&self, task: &Task) -> CalendarResult<()> {
        let mut state = self.write_state();
        state.calls += 1;
        if let Some(message) = &state.unreachable {
            return Err(CalendarError::Unreachable(message.clone()));
        }
        let Some(due_at) = task.due_at() else {
            return Err(CalendarError::Rejected {
                task_id: task.id(),
                reason: "task has no due date".to_owned(),
            });
        };
        state.events.insert(task.id(), due_at);
        Ok(())
    }

    async fn remove_event(&self, task_id: TaskId) -> CalendarResult<()> {
        let mut state = self.write_state();
        state.calls += 1;
        if let Some(message) = &state.unreachable {
            return Err(CalendarError::Unreachable(message.clone()));
        }
        state.events.remove(&task_id);
        Ok(())
    }
}
