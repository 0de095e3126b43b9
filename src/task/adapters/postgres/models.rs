//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Work status.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Category.
    pub category: String,
    /// Due timestamp.
    pub due_at: Option<DateTime<Utc>>,
    /// Assignee.
    pub assignee_id: Option<uuid::Uuid>,
    /// Linked entity.
    pub entity_id: Option<uuid::Uuid>,
    /// Linked stage.
    pub stage: Option<String>,
    /// Source template key.
    pub template_key: Option<String>,
    /// Blocking flag.
    pub blocks_progression: bool,
    /// Calendar mirror state.
    pub calendar_status: String,
    /// Last calendar error.
    pub calendar_error: Option<String>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Author.
    pub created_by: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for task records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskRecord {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Work status.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Category.
    pub category: String,
    /// Due timestamp.
    pub due_at: Option<DateTime<Utc>>,
    /// Assignee.
    pub assignee_id: Option<uuid::Uuid>,
    /// Linked entity.
    pub entity_id: Option<uuid::Uuid>,
    /// Linked stage.
    pub stage: Option<String>,
    /// Source template key.
    pub template_key: Option<String>,
    /// Blocking flag.
    pub blocks_progression: bool,
    /// Calendar mirror state.
    pub calendar_status: String,
    /// Last calendar error.
    pub calendar_error: Option<String>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Author.
    pub created_by: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
