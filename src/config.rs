//! Engine configuration loaded from TOML.
//!
//! ```toml
//! calendar_timeout_ms = 3000
//! lock_timeout_ms = 1500
//! portal_may_create_tasks = true
//!
//! [[templates]]
//! key = "briefing.kickoff"
//! stage = "briefing"
//! title = "Hold kickoff call"
//! priority = "high"
//! ```

use crate::pipeline::domain::{
    PipelineDomainError, Stage, StageCatalogue, TaskTemplate, TemplateKey,
};
use crate::task::domain::{TaskCategory, TaskPriority};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors returned while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// File path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for [`JourneyConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configured templates do not form a valid catalogue.
    #[error("invalid stage catalogue: {0}")]
    Catalogue(#[from] PipelineDomainError),
}

/// Deploy-time template definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateConfig {
    /// Stable template key.
    pub key: String,
    /// Owning stage.
    pub stage: Stage,
    /// Title given to materialized tasks.
    pub title: String,
    /// Default priority.
    #[serde(default)]
    pub priority: TaskPriority,
    /// Stored category.
    #[serde(default)]
    pub category: TaskCategory,
    /// Whether materialized tasks block progression.
    #[serde(default = "default_blocks_progression")]
    pub blocks_progression: bool,
}

const fn default_blocks_progression() -> bool {
    true
}

/// Runtime settings for the journey engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JourneyConfig {
    /// Upper bound on each calendar adapter call, in milliseconds.
    pub calendar_timeout_ms: u64,
    /// Maximum wait for a per-entity lock, in milliseconds.
    pub lock_timeout_ms: u64,
    /// Whether portal callers may create freeform tasks.
    pub portal_may_create_tasks: bool,
    /// Replacement catalogue; the built-in catalogue is used when absent.
    pub templates: Option<Vec<TemplateConfig>>,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            calendar_timeout_ms: 5_000,
            lock_timeout_ms: 2_000,
            portal_may_create_tasks: false,
            templates: None,
        }
    }
}

impl JourneyConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = path.as_ref();
        let text = std::fs::read_to_string(file).map_err(|source| ConfigError::Read {
            path: file.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Returns the calendar call bound.
    #[must_use]
    pub const fn calendar_timeout(&self) -> Duration {
        Duration::from_millis(self.calendar_timeout_ms)
    }

    /// Returns the per-entity lock wait bound.
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Builds the stage catalogue this configuration describes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Catalogue`] for invalid keys, blank titles,
    /// duplicate keys or templates on the terminal stage.
    pub fn catalogue(&self) -> Result<StageCatalogue, ConfigError> {
        let Some(templates) = &self.templates else {
            return Ok(StageCatalogue::builtin());
        };
        let built = templates
            .iter()
            .map(|entry| {
                Ok(TaskTemplate::new(
                    TemplateKey::new(entry.key.as_str())?,
                    entry.stage,
                    entry.title.as_str(),
                    entry.priority,
                )?
                .with_category(entry.category)
                .blocking(entry.blocks_progression))
            })
            .collect::<Result<Vec<_>, PipelineDomainError>>()?;
        Ok(StageCatalogue::new(built)?)
    }
}
