//! Best-effort audit appends that never fail the primary mutation.

use crate::journey::{domain::AuditEntry, ports::AuditSink};
use std::sync::Arc;

/// Appends entries after their mutation committed and logs sink failures.
pub(crate) struct AuditTrail<A: AuditSink> {
    sink: Arc<A>,
}

impl<A: AuditSink> Clone for AuditTrail<A> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<A: AuditSink> AuditTrail<A> {
    pub(crate) const fn new(sink: Arc<A>) -> Self {
        Self { sink }
    }

    pub(crate) const fn sink(&self) -> &Arc<A> {
        &self.sink
    }

    pub(crate) async fn record(&self, entry: AuditEntry) {
        if let Err(err) = self.sink.append(&entry).await {
            tracing::warn!(
                entry_id = %entry.id,
                subject = ?entry.subject,
                action = ?entry.action,
                error = %err,
                "audit append failed; mutation already committed"
            );
        }
    }
}
