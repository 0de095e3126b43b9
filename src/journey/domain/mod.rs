//! Domain values shared by journey services and their ports.

mod audit;
mod caller;
mod progress;

pub use audit::{AuditAction, AuditEntry, AuditSubject, FieldChange};
pub use caller::{Caller, Capability, Surface};
pub use progress::{BlockingTask, SyncStatusView};
