// libs/appointment-cell/src/services/locking.rs
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

/// Registry size above which idle entries are pruned on acquire.
const PRUNE_THRESHOLD: usize = 1024;

type LockKey = (Uuid, Uuid);

/// One async mutex per (clinic, professional). Holding the guard serializes
/// the conflict check and the write for that professional's calendar.
#[derive(Default)]
pub struct ProfessionalLocks {
    locks: Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>,
}

impl ProfessionalLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, clinic_id: Uuid, professional_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            if locks.len() > PRUNE_THRESHOLD {
                // Only the registry holds an idle lock.
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            Arc::clone(locks.entry((clinic_id, professional_id)).or_default())
        };

        debug!("Waiting for scheduling lock of professional {}", professional_id);
        lock.lock_owned().await
    }

    pub fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
