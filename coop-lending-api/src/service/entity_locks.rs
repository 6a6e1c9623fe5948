//! Per-entity mutual exclusion.
//!
//! Mutating lending operations hold the lock of the loan they touch and of
//! the member whose balance they change, so the read-decide-write sequence on
//! either entity is never interleaved with another operation on it.
//! Operations on unrelated loans and members proceed in parallel.
//!
//! Callers acquire loan locks before member locks.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Default)]
pub struct EntityLocks {
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

/// Held lock on one entity; released on drop
pub type EntityGuard = OwnedMutexGuard<()>;

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: Uuid) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock();
        if locks.len() >= PRUNE_THRESHOLD {
            // nobody holds or waits on an entry whose only owner is the map
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        locks.entry(id).or_default().clone()
    }

    pub async fn lock(&self, id: Uuid) -> EntityGuard {
        self.slot(id).lock_owned().await
    }

    /// Number of entities currently tracked
    pub fn tracked(&self) -> usize {
        self.locks.lock().len()
    }
}
