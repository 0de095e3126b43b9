//! Step definitions for journey stage scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
