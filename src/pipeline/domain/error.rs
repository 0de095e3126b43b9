//! Error types for pipeline domain validation and parsing.

use super::{PipelineEntityId, Stage};
use thiserror::Error;

/// Errors returned while constructing or mutating pipeline domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineDomainError {
    /// The entity display name is empty after trimming.
    #[error("pipeline entity display name must not be empty")]
    EmptyDisplayName,

    /// The template key is empty or contains whitespace.
    #[error("invalid task template key '{0}'")]
    InvalidTemplateKey(String),

    /// The template title is empty after trimming.
    #[error("task template '{0}' must have a title")]
    EmptyTemplateTitle(String),

    /// Two templates share the same key.
    #[error("duplicate task template key '{0}'")]
    DuplicateTemplate(String),

    /// A template was attached to the terminal stage.
    #[error("task template '{key}' cannot belong to terminal stage {stage}")]
    TemplateOnTerminalStage {
        /// Offending template key.
        key: String,
        /// Terminal stage the template named.
        stage: Stage,
    },

    /// The requested stage move does not follow the pipeline order.
    #[error("pipeline entity {entity_id} cannot move from {from} to {to}")]
    InvalidStageTransition {
        /// Entity being moved.
        entity_id: PipelineEntityId,
        /// Current stage.
        from: Stage,
        /// Requested stage.
        to: Stage,
    },
}

/// Error returned while parsing stages from persistence or configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown pipeline stage: {0}")]
pub struct ParseStageError(pub String);

/// Error returned while parsing entity kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown pipeline entity kind: {0}")]
pub struct ParseEntityKindError(pub String);
