// libs/ai-pause-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::post, Router};

use crate::handlers;
use crate::services::pause::AiPauseService;

pub fn ai_pause_routes(service: Arc<AiPauseService>) -> Router {
    Router::new()
        .route("/clinics/{clinic_id}/ai-pause/evaluate", post(handlers::evaluate_pause))
        .route("/ai-pause/should-respond", post(handlers::should_respond))
        .with_state(service)
}
