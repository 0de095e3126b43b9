//! Identifier types for the task domain.

use crate::pipeline::domain::uuid_id;

uuid_id!(
    /// Unique identifier for a task record.
    TaskId
);
