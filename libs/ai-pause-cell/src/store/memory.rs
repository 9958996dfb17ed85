// libs/ai-pause-cell/src/store/memory.rs
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::ClinicPauseConfig;
use crate::store::{PauseConfigStore, PauseStoreError};

#[derive(Default)]
pub struct InMemoryPauseConfigStore {
    configs: RwLock<HashMap<Uuid, ClinicPauseConfig>>,
    failing: AtomicBool,
}

impl InMemoryPauseConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_config(&self, clinic_id: Uuid, config: ClinicPauseConfig) {
        self.configs.write().await.insert(clinic_id, config);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl PauseConfigStore for InMemoryPauseConfigStore {
    async fn get_pause_config(&self, clinic_id: Uuid) -> Result<Option<ClinicPauseConfig>, PauseStoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PauseStoreError::Unavailable("in-memory pause settings marked failing".to_string()));
        }
        Ok(self.configs.read().await.get(&clinic_id).cloned())
    }
}
