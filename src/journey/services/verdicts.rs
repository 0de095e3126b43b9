//! Cached `can_advance` verdicts shared by the gate and the generator.

use crate::pipeline::domain::{PipelineEntityId, Stage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CachedVerdict {
    stage: Stage,
    can_advance: bool,
}

/// Per-entity verdict cache with an invalidation generation.
///
/// A verdict is only stored when no invalidation happened between the
/// caller's [`Self::generation`] read and [`Self::remember`].
#[derive(Debug, Default)]
pub(crate) struct GateVerdicts {
    entries: RwLock<HashMap<PipelineEntityId, CachedVerdict>>,
    invalidations: AtomicU64,
}

impl GateVerdicts {
    pub(crate) fn generation(&self) -> u64 {
        self.invalidations.load(Ordering::Acquire)
    }

    pub(crate) fn cached(&self, entity_id: PipelineEntityId, stage: Stage) -> Option<bool> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&entity_id)
            .filter(|verdict| verdict.stage == stage)
            .map(|verdict| verdict.can_advance)
    }

    pub(crate) fn remember(
        &self,
        entity_id: PipelineEntityId,
        stage: Stage,
        can_advance: bool,
        seen: u64,
    ) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if self.invalidations.load(Ordering::Acquire) == seen {
            entries.insert(entity_id, CachedVerdict { stage, can_advance });
        }
    }

    pub(crate) fn invalidate(&self, entity_id: PipelineEntityId) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        self.invalidations.fetch_add(1, Ordering::AcqRel);
        let removed = entries.remove(&entity_id);
        drop(entries);
        if removed.is_some() {
            debug!(%entity_id, "gate cache invalidated");
        }
    }
}
