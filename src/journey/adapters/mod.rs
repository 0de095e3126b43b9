//! Adapter implementations for journey ports.

pub mod memory;
mod policy;

pub use policy::SurfacePolicy;
