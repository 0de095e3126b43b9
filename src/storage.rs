//! `PostgreSQL` schema setup shared by the pipeline and task adapters.
//!
//! The SQL lives under `migrations/` in Diesel's directory layout and is
//! embedded into the binary, so a deployment can bring a database up to
//! date without the Diesel CLI.

use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use thiserror::Error;
use tracing::info;

/// Every schema migration, in application order.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while preparing the database schema.
#[derive(Debug, Error)]
pub enum StorageSetupError {
    /// A migration failed to apply.
    #[error("failed to apply schema migrations: {0}")]
    Migration(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Applies pending migrations and returns how many ran.
///
/// Blocking; call it from `spawn_blocking` or synchronous start-up code.
///
/// # Errors
///
/// Returns [`StorageSetupError::Migration`] when a migration fails.
pub fn run_migrations(connection: &mut PgConnection) -> Result<usize, StorageSetupError> {
    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(StorageSetupError::Migration)?;
    info!(applied = applied.len(), "schema migrations applied");
    Ok(applied.len())
}
