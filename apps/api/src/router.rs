use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};
use tracing::{info, warn};

use ai_pause_cell::router::ai_pause_routes;
use ai_pause_cell::services::pause::AiPauseService;
use ai_pause_cell::store::{InMemoryPauseConfigStore, PauseConfigStore, SupabasePauseConfigStore};
use appointment_cell::router::appointment_routes;
use appointment_cell::services::booking::{AppointmentBookingService, SchedulingDeps, SchedulingSettings};
use appointment_cell::store::InMemoryStore;
use shared_config::AppConfig;
use shared_utils::SystemClock;

pub fn create_router(config: &AppConfig) -> Router {
    let clock = SystemClock::shared();

    let (scheduling_deps, pause_store): (SchedulingDeps, Arc<dyn PauseConfigStore>) = if config.is_configured() {
        info!("Using Supabase stores at {}", config.supabase_url);
        (
            SchedulingDeps::supabase(config, clock.clone()),
            Arc::new(SupabasePauseConfigStore::new(config)),
        )
    } else {
        warn!("Supabase is not configured, falling back to in-memory stores");
        (
            SchedulingDeps::in_memory(Arc::new(InMemoryStore::new()), clock.clone()),
            Arc::new(InMemoryPauseConfigStore::new()),
        )
    };

    let booking = Arc::new(AppointmentBookingService::new(
        scheduling_deps,
        SchedulingSettings::from_config(config),
    ));
    let ai_pause = Arc::new(AiPauseService::new(pause_store, clock));

    Router::new()
        .route("/", get(|| async { "Clinic scheduling API is running!" }))
        .merge(appointment_routes(booking))
        .merge(ai_pause_routes(ai_pause))
}
