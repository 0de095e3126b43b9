//! In-memory pipeline entity adapters.

mod entity;

pub use entity::InMemoryPipelineEntityRepository;
