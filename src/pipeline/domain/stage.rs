//! The ordered pipeline stages.

use super::ParseStageError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of the fixed, linear pipeline.
///
/// Declaration order is the pipeline order, so the derived [`Ord`] matches
/// stage progression.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// The business brief is being collected and reviewed.
    Briefing,
    /// Creator visits are being scheduled.
    Scheduling,
    /// Content is being delivered and approved.
    FinalDelivery,
    /// Terminal stage; nothing further is materialized.
    Completed,
}

impl Stage {
    /// Every stage in pipeline order.
    pub const ALL: [Self; 4] = [
        Self::Briefing,
        Self::Scheduling,
        Self::FinalDelivery,
        Self::Completed,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Briefing => "briefing",
            Self::Scheduling => "scheduling",
            Self::FinalDelivery => "final_delivery",
            Self::Completed => "completed",
        }
    }

    /// Zero-based position in the pipeline.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Briefing => 0,
            Self::Scheduling => 1,
            Self::FinalDelivery => 2,
            Self::Completed => 3,
        }
    }

    /// Returns the stage that follows this one, or `None` for
    /// [`Stage::Completed`].
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Briefing => Some(Self::Scheduling),
            Self::Scheduling => Some(Self::FinalDelivery),
            Self::FinalDelivery => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    /// Returns `true` for the terminal stage.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl TryFrom<&str> for Stage {
    type Error = ParseStageError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "briefing" => Ok(Self::Briefing),
            "scheduling" => Ok(Self::Scheduling),
            "final_delivery" => Ok(Self::FinalDelivery),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseStageError(value.to_owned())),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
