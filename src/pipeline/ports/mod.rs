//! Port contracts for pipeline entity persistence.

pub mod repository;

pub use repository::{
    PipelineEntityRepository, PipelineEntityRepositoryError, PipelineEntityRepositoryResult,
};
