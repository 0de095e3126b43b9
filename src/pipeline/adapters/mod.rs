//! Adapter implementations for pipeline entity ports.

pub mod memory;
pub mod postgres;
