// libs/ai-pause-cell/src/store/supabase.rs
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{SupabaseClient, SupabaseError};

use crate::models::ClinicPauseConfig;
use crate::store::{PauseConfigStore, PauseStoreError};

/// Reads `ai_pause_duration` and `ai_pause_unit` from the `clinics` table.
pub struct SupabasePauseConfigStore {
    supabase: SupabaseClient,
    service_token: Option<String>,
}

impl SupabasePauseConfigStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            service_token: config.service_token().map(str::to_string),
        }
    }
}

impl From<SupabaseError> for PauseStoreError {
    fn from(error: SupabaseError) -> Self {
        match error {
            SupabaseError::Decode(msg) => PauseStoreError::Decode(msg),
            other => PauseStoreError::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
impl PauseConfigStore for SupabasePauseConfigStore {
    async fn get_pause_config(&self, clinic_id: Uuid) -> Result<Option<ClinicPauseConfig>, PauseStoreError> {
        let path = format!(
            "/rest/v1/clinics?id=eq.{}&select=ai_pause_duration,ai_pause_unit&limit=1",
            clinic_id
        );
        debug!("Fetching AI pause settings for clinic {}", clinic_id);

        let rows: Vec<Value> = self.supabase
            .request(Method::GET, &path, self.service_token.as_deref(), None)
            .await?;

        rows.into_iter()
            .next()
            .map(|row| serde_json::from_value::<ClinicPauseConfig>(row)
                .map_err(|e| PauseStoreError::Decode(e.to_string())))
            .transpose()
    }
}
