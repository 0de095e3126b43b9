//! Append-only audit sink port.

use crate::journey::domain::AuditEntry;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for audit sink operations.
pub type AuditSinkResult<T> = Result<T, AuditSinkError>;

/// Destination for audit entries.
///
/// Delivery is at-least-once: callers append after the primary mutation
/// commits and may repeat an entry, never drop the mutation.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Appends an entry.
    ///
    /// # Errors
    ///
    /// Returns [`AuditSinkError`] when the sink cannot accept the entry.
    async fn append(&self, entry: &AuditEntry) -> AuditSinkResult<()>;
}

/// Errors returned by audit sink adapters.
#[derive(Debug, Clone, Error)]
pub enum AuditSinkError {
    /// The sink is unavailable.
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),

    /// Sink-specific failure.
    #[error("audit sink error: {0}")]
    Sink(Arc<dyn std::error::Error + Send + Sync>),
}

impl AuditSinkError {
    /// Wraps an adapter error.
    pub fn sink(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Sink(Arc::new(err))
    }
}
