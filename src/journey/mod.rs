//! Journey stage engine.
//!
//! Coordinates task materialization, stage progression and task lifecycle
//! operations for the admin and portal surfaces. External collaborators
//! (audit log, calendar, capability checks) are reached through ports:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
