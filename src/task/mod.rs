//! Task store for pipeline work items.
//!
//! Tasks are either materialized from a stage's templates or authored
//! directly by a user. This module owns the task aggregate, the listing
//! order shared by every consumer surface, and the persistence port:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
