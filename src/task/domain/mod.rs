//! Domain model for pipeline tasks.
//!
//! The task domain covers task values, their lifecycle mutations and the
//! deterministic listing order, keeping storage concerns outside of the
//! domain boundary.

mod error;
mod ids;
mod ordering;
mod task;
mod values;

pub use error::{ParseTaskValueError, TaskDomainError};
pub use ids::TaskId;
pub use ordering::{listing_order, sort_for_listing};
pub use task::{NewFreeformTask, PersistedTaskData, StageLink, Task, TaskOrigin};
pub use values::{CalendarSyncStatus, TaskCategory, TaskPriority, TaskStatus};
