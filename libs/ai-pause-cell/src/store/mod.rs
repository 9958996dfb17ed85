// libs/ai-pause-cell/src/store/mod.rs
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::ClinicPauseConfig;

pub mod memory;
pub mod supabase;

pub use memory::InMemoryPauseConfigStore;
pub use supabase::SupabasePauseConfigStore;

#[derive(Debug, Error)]
pub enum PauseStoreError {
    #[error("pause settings unavailable: {0}")]
    Unavailable(String),

    #[error("failed to decode pause settings: {0}")]
    Decode(String),
}

#[async_trait]
pub trait PauseConfigStore: Send + Sync {
    /// `None` when the clinic has no settings row.
    async fn get_pause_config(&self, clinic_id: Uuid) -> Result<Option<ClinicPauseConfig>, PauseStoreError>;
}
