//! Domain model for pipeline entities, stages and task templates.

mod catalogue;
mod entity;
mod error;
mod ids;
mod stage;

pub use catalogue::{StageCatalogue, TaskTemplate, TemplateKey};
pub use entity::{EntityKind, PersistedEntityData, PipelineEntity};
pub use error::{ParseEntityKindError, ParseStageError, PipelineDomainError};
pub(crate) use ids::uuid_id;
pub use ids::{OrganizationId, PipelineEntityId, UserId};
pub use stage::Stage;
