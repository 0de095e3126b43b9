//! Journey stage engine.
//!
//! Tracks businesses and campaigns through a fixed stage pipeline,
//! materializes the checklist of tasks each stage requires, decides when an
//! entity may advance, and keeps task state consistent across the admin
//! dashboard, the creator portal and an external calendar.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, calendar, audit)
//!
//! # Modules
//!
//! - [`pipeline`]: Stages, the task template catalogue and pipeline entities
//! - [`task`]: Task records, listing order and task persistence
//! - [`journey`]: Generation, progression and task lifecycle services
//! - [`config`]: Runtime configuration
//! - [`storage`]: `PostgreSQL` schema migrations

pub mod config;
pub mod journey;
pub mod pipeline;
pub mod storage;
pub mod task;
