//! Pipeline entities and the fixed stage catalogue.
//!
//! A pipeline entity is a business or campaign moving through the linear
//! `Briefing -> Scheduling -> FinalDelivery -> Completed` chain. This module
//! owns the entity record, the stage ordering and the catalogue of task
//! templates each stage requires:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
