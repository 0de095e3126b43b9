//! `PostgreSQL` adapters for pipeline entity persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PipelinePgPool, PostgresPipelineEntityRepository};
