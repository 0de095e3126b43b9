//! Port contracts for the engine's external collaborators.

pub mod audit;
pub mod calendar;
pub mod policy;

pub use audit::{AuditSink, AuditSinkError, AuditSinkResult};
pub use calendar::{CalendarError, CalendarGateway, CalendarResult};
pub use policy::CapabilityPolicy;
