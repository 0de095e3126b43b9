//! Diesel row models for pipeline entity persistence.

use super::schema::pipeline_entities;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for pipeline entity records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pipeline_entities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PipelineEntityRow {
    /// Entity identifier.
    pub id: uuid::Uuid,
    /// Entity kind.
    pub kind: String,
    /// Display name.
    pub display_name: String,
    /// Current stage.
    pub stage: String,
    /// Owning organization.
    pub organization_id: uuid::Uuid,
    /// Activity flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for pipeline entity records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pipeline_entities)]
pub struct NewPipelineEntityRow {
    /// Entity identifier.
    pub id: uuid::Uuid,
    /// Entity kind.
    pub kind: String,
    /// Display name.
    pub display_name: String,
    /// Current stage.
    pub stage: String,
    /// Owning organization.
    pub organization_id: uuid::Uuid,
    /// Activity flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
