//! Diesel schema for task persistence.
//!
//! Generated tasks are unique per (entity, stage, template) through the
//! partial index `idx_tasks_generated_unique`, created by the
//! `add_generated_task_uniqueness` migration.

diesel::table! {
    /// Task records linked to pipeline entity stages.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Work status.
        #[max_length = 50]
        status -> Varchar,
        /// Priority.
        #[max_length = 50]
        priority -> Varchar,
        /// Stored category.
        #[max_length = 50]
        category -> Varchar,
        /// Optional due timestamp.
        due_at -> Nullable<Timestamptz>,
        /// Optional assignee.
        assignee_id -> Nullable<Uuid>,
        /// Linked pipeline entity.
        entity_id -> Nullable<Uuid>,
        /// Linked stage.
        #[max_length = 50]
        stage -> Nullable<Varchar>,
        /// Source template for generated tasks.
        #[max_length = 255]
        template_key -> Nullable<Varchar>,
        /// Whether the task holds its stage until done.
        blocks_progression -> Bool,
        /// Calendar mirror state.
        #[max_length = 50]
        calendar_status -> Varchar,
        /// Last calendar error.
        calendar_error -> Nullable<Text>,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Author, null for generated tasks.
        created_by -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
