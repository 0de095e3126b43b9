//! Diesel schema for pipeline entity persistence.

diesel::table! {
    /// Businesses and campaigns progressing through the stage pipeline.
    pipeline_entities (id) {
        /// Entity identifier.
        id -> Uuid,
        /// Entity kind (`business` or `campaign`).
        #[max_length = 50]
        kind -> Varchar,
        /// Human-readable name.
        #[max_length = 255]
        display_name -> Varchar,
        /// Current stage.
        #[max_length = 50]
        stage -> Varchar,
        /// Owning organization.
        organization_id -> Uuid,
        /// Whether the entity is still active.
        active -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
