//! Static catalogue of the task templates each stage requires.

use super::{PipelineDomainError, Stage};
use crate::task::domain::{TaskCategory, TaskPriority};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Stable key identifying a task template across deployments.
///
/// Generated tasks remember the key they were materialized from; the pair
/// (entity, stage, key) is unique in storage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateKey(String);

impl TemplateKey {
    /// Creates a validated template key.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::InvalidTemplateKey`] when the key is
    /// empty or contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, PipelineDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() || normalized.chars().any(char::is_whitespace) {
            return Err(PipelineDomainError::InvalidTemplateKey(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the key as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TemplateKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalogue definition of a work item required at a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    key: TemplateKey,
    stage: Stage,
    title: String,
    priority: TaskPriority,
    category: TaskCategory,
    blocks_progression: bool,
}

impl TaskTemplate {
    /// Creates a blocking template with the general category.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::EmptyTemplateTitle`] when the title is
    /// blank.
    pub fn new(
        key: TemplateKey,
        stage: Stage,
        title: impl Into<String>,
        priority: TaskPriority,
    ) -> Result<Self, PipelineDomainError> {
        let raw_title = title.into();
        let trimmed = raw_title.trim();
        if trimmed.is_empty() {
            return Err(PipelineDomainError::EmptyTemplateTitle(key.to_string()));
        }
        Ok(Self {
            key,
            stage,
            title: trimmed.to_owned(),
            priority,
            category: TaskCategory::General,
            blocks_progression: true,
        })
    }

    /// Sets the category copied onto materialized tasks.
    #[must_use]
    pub const fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = category;
        self
    }

    /// Sets whether materialized tasks hold the stage until done.
    #[must_use]
    pub const fn blocking(mut self, blocks_progression: bool) -> Self {
        self.blocks_progression = blocks_progression;
        self
    }

    /// Returns the template key.
    #[must_use]
    pub const fn key(&self) -> &TemplateKey {
        &self.key
    }

    /// Returns the owning stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns the title given to materialized tasks.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the default priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the category.
    #[must_use]
    pub const fn category(&self) -> TaskCategory {
        self.category
    }

    /// Returns `true` when materialized tasks block stage progression.
    #[must_use]
    pub const fn blocks_progression(&self) -> bool {
        self.blocks_progression
    }
}

/// Read-only lookup of stage order and per-stage templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageCatalogue {
    templates: BTreeMap<Stage, Vec<TaskTemplate>>,
}

impl StageCatalogue {
    /// Builds a catalogue from templates, preserving their order per stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::DuplicateTemplate`] when two templates
    /// share a key, or [`PipelineDomainError::TemplateOnTerminalStage`] when
    /// a template names [`Stage::Completed`].
    pub fn new(
        templates: impl IntoIterator<Item = TaskTemplate>,
    ) -> Result<Self, PipelineDomainError> {
        let mut seen = HashSet::new();
        let mut by_stage: BTreeMap<Stage, Vec<TaskTemplate>> = BTreeMap::new();
        for template in templates {
            if template.stage().is_terminal() {
                return Err(PipelineDomainError::TemplateOnTerminalStage {
                    key: template.key().to_string(),
                    stage: template.stage(),
                });
            }
            if !seen.insert(template.key().clone()) {
                return Err(PipelineDomainError::DuplicateTemplate(
                    template.key().to_string(),
                ));
            }
            by_stage.entry(template.stage()).or_default().push(template);
        }
        Ok(Self {
            templates: by_stage,
        })
    }

    /// Returns the catalogue shipped with the engine.
    #[must_use]
    pub fn builtin() -> Self {
        let entries = [
            (
                "briefing.review_brief",
                Stage::Briefing,
                "Review business brief",
                TaskPriority::High,
                TaskCategory::Business,
                true,
            ),
            (
                "briefing.shortlist_creators",
                Stage::Briefing,
                "Confirm creator shortlist",
                TaskPriority::Medium,
                TaskCategory::Creator,
                true,
            ),
            (
                "briefing.share_guidelines",
                Stage::Briefing,
                "Share brand guidelines with creators",
                TaskPriority::Low,
                TaskCategory::Content,
                false,
            ),
            (
                "scheduling.book_visit",
                Stage::Scheduling,
                "Schedule creator visit",
                TaskPriority::High,
                TaskCategory::Creator,
                true,
            ),
            (
                "scheduling.confirm_business",
                Stage::Scheduling,
                "Confirm visit date with business",
                TaskPriority::Medium,
                TaskCategory::Business,
                true,
            ),
            (
                "scheduling.remind_creator",
                Stage::Scheduling,
                "Send visit reminder to creator",
                TaskPriority::Low,
                TaskCategory::Creator,
                false,
            ),
            (
                "final_delivery.collect_content",
                Stage::FinalDelivery,
                "Collect creator content",
                TaskPriority::Urgent,
                TaskCategory::Content,
                true,
            ),
            (
                "final_delivery.approve_deliverables",
                Stage::FinalDelivery,
                "Review and approve deliverables",
                TaskPriority::High,
                TaskCategory::Content,
                true,
            ),
            (
                "final_delivery.share_report",
                Stage::FinalDelivery,
                "Share performance report with business",
                TaskPriority::Medium,
                TaskCategory::Operations,
                false,
            ),
        ];

        let mut templates: BTreeMap<Stage, Vec<TaskTemplate>> = BTreeMap::new();
        for (key, stage, title, priority, category, blocks_progression) in entries {
            templates.entry(stage).or_default().push(TaskTemplate {
                key: TemplateKey(key.to_owned()),
                stage,
                title: title.to_owned(),
                priority,
                category,
                blocks_progression,
            });
        }
        Self { templates }
    }

    /// Returns the ordered templates required at `stage`.
    ///
    /// The terminal stage always yields an empty slice.
    #[must_use]
    pub fn templates_for_stage(&self, stage: Stage) -> &[TaskTemplate] {
        self.templates.get(&stage).map_or(&[], Vec::as_slice)
    }

    /// Returns the stage following `stage`, or `None` when terminal.
    #[must_use]
    pub const fn next_stage(&self, stage: Stage) -> Option<Stage> {
        stage.next()
    }

    /// Looks up a template by key.
    #[must_use]
    pub fn template(&self, key: &TemplateKey) -> Option<&TaskTemplate> {
        self.templates
            .values()
            .flatten()
            .find(|template| template.key() == key)
    }

    /// Returns the total number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.values().map(Vec::len).sum()
    }

    /// Returns `true` when no stage carries templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
