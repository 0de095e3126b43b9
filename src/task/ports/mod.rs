//! Port contracts for task persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by journey services.

pub mod query;
pub mod repository;

pub use query::{TaskFilter, TaskQuery, TaskVisibility};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
