//! In-memory audit log.

use crate::journey::{
    domain::{AuditEntry, AuditSubject},
    ports::{AuditSink, AuditSinkError, AuditSinkResult},
};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Append-only audit log held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLog {
    state: Arc<RwLock<AuditLogState>>,
}

#[derive(Debug, Default)]
struct AuditLogState {
    entries: Vec<AuditEntry>,
    unavailable: bool,
}

impl InMemoryAuditLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent appends fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.unavailable = unavailable;
    }

    /// Returns every recorded entry in append order.
    #[must_use]
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .entries
            .clone()
    }

    /// Returns the entries recorded for one subject.
    #[must_use]
    pub fn entries_for(&self, subject: AuditSubject) -> Vec<AuditEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.subject == subject)
            .collect()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditLog {
    async fn append(&self, entry: &AuditEntry) -> AuditSinkResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| AuditSinkError::sink(std::io::Error::other(err.to_string())))?;
        if state.unavailable {
            return Err(AuditSinkError::Unavailable(
                "in-memory audit log switched off".to_owned(),
            ));
        }
        state.entries.push(entry.clone());
        Ok(())
    }
}
