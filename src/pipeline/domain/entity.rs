//! Pipeline entity aggregate.

use super::{OrganizationId, ParseEntityKindError, PipelineDomainError, PipelineEntityId, Stage};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of record progressing through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A local business onboarding with the platform.
    Business,
    /// A campaign run for a business.
    Campaign,
}

impl EntityKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Campaign => "campaign",
        }
    }
}

impl TryFrom<&str> for EntityKind {
    type Error = ParseEntityKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "business" => Ok(Self::Business),
            "campaign" => Ok(Self::Campaign),
            _ => Err(ParseEntityKindError(value.to_owned())),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A business or campaign and the stage it currently occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineEntity {
    id: PipelineEntityId,
    kind: EntityKind,
    display_name: String,
    stage: Stage,
    organization_id: OrganizationId,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted pipeline entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedEntityData {
    /// Persisted identifier.
    pub id: PipelineEntityId,
    /// Persisted kind.
    pub kind: EntityKind,
    /// Persisted display name.
    pub display_name: String,
    /// Persisted current stage.
    pub stage: Stage,
    /// Persisted organization scope.
    pub organization_id: OrganizationId,
    /// Whether the entity is still active.
    pub active: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl PipelineEntity {
    /// Creates an active entity at the first pipeline stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::EmptyDisplayName`] when the name is
    /// blank.
    pub fn new(
        kind: EntityKind,
        display_name: impl Into<String>,
        organization_id: OrganizationId,
        clock: &impl Clock,
    ) -> Result<Self, PipelineDomainError> {
        let raw = display_name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PipelineDomainError::EmptyDisplayName);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: PipelineEntityId::new(),
            kind,
            display_name: trimmed.to_owned(),
            stage: Stage::Briefing,
            organization_id,
            active: true,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs an entity from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedEntityData) -> Self {
        Self {
            id: data.id,
            kind: data.kind,
            display_name: data.display_name,
            stage: data.stage,
            organization_id: data.organization_id,
            active: data.active,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the entity identifier.
    #[must_use]
    pub const fn id(&self) -> PipelineEntityId {
        self.id
    }

    /// Returns the entity kind.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the current stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns the organization scope.
    #[must_use]
    pub const fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns `false` once the entity has been deactivated.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the entity to `next`, which must directly follow the current
    /// stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::InvalidStageTransition`] for any other
    /// target, including a move backwards or a skipped stage.
    pub fn advance_to(
        &mut self,
        next: Stage,
        clock: &impl Clock,
    ) -> Result<(), PipelineDomainError> {
        if self.stage.next() != Some(next) {
            return Err(PipelineDomainError::InvalidStageTransition {
                entity_id: self.id,
                from: self.stage,
                to: next,
            });
        }
        self.stage = next;
        self.touch(clock);
        Ok(())
    }

    /// Marks the entity inactive. Entities are never hard-deleted.
    ///
    /// Returns `false` when the entity was already inactive.
    pub fn deactivate(&mut self, clock: &impl Clock) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.touch(clock);
        true
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
