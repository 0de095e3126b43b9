//! In-memory collaborators for tests and local runs.

mod audit;
mod calendar;

pub use audit::InMemoryAuditLog;
pub use calendar::InMemoryCalendar;
