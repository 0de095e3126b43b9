//! Per-entity mutual exclusion for stage-affecting writes.

use super::{JourneyError, JourneyResult};
use crate::pipeline::domain::PipelineEntityId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Table of async locks keyed by pipeline entity.
///
/// Requests for different entities never contend. Waiting is bounded; a
/// request that cannot acquire the lock in time fails with the transient
/// [`JourneyError::EntityBusy`].
#[derive(Debug)]
pub struct EntityLocks {
    slots: Mutex<HashMap<PipelineEntityId, Arc<AsyncMutex<()>>>>,
    wait: Duration,
}

/// Proof of exclusive access to one entity; released on drop.
#[derive(Debug)]
pub struct EntityGuard {
    entity_id: PipelineEntityId,
    _guard: OwnedMutexGuard<()>,
}

impl EntityGuard {
    /// Returns the locked entity.
    #[must_use]
    pub const fn entity_id(&self) -> PipelineEntityId {
        self.entity_id
    }
}

impl EntityLocks {
    /// Creates a lock table with the given maximum wait.
    #[must_use]
    pub fn new(wait: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            wait,
        }
    }

    /// Acquires the lock for `entity_id`.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::EntityBusy`] when the lock is not obtained
    /// within the configured wait.
    pub async fn acquire(&self, entity_id: PipelineEntityId) -> JourneyResult<EntityGuard> {
        let slot = self.slot(entity_id);
        match tokio::time::timeout(self.wait, slot.lock_owned()).await {
            Ok(guard) => Ok(EntityGuard {
                entity_id,
                _guard: guard,
            }),
            Err(_) => {
                tracing::warn!(%entity_id, wait = ?self.wait, "entity lock wait exceeded");
                Err(JourneyError::EntityBusy(entity_id))
            }
        }
    }

    fn slot(&self, entity_id: PipelineEntityId) -> Arc<AsyncMutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // Drop slots nobody holds or waits on so the table tracks only
        // entities with requests in flight.
        slots.retain(|id, slot| *id == entity_id || Arc::strong_count(slot) > 1);
        Arc::clone(slots.entry(entity_id).or_default())
    }
}

impl Default for EntityLocks {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}
