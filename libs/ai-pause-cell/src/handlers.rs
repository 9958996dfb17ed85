// libs/ai-pause-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{EvaluatePauseRequest, ShouldRespondRequest};
use crate::services::pause::AiPauseService;

pub async fn evaluate_pause(
    State(service): State<Arc<AiPauseService>>,
    Path(clinic_id): Path<Uuid>,
    Json(request): Json<EvaluatePauseRequest>,
) -> Json<Value> {
    let decision = service.evaluate_for_clinic(
        clinic_id,
        &request.message,
        request.current_ai_active,
        request.current_pause_reason,
    ).await;

    Json(json!(decision))
}

pub async fn should_respond(
    State(service): State<Arc<AiPauseService>>,
    Json(request): Json<ShouldRespondRequest>,
) -> Json<Value> {
    let now = service.policy().now();

    Json(json!({
        "should_respond": service.should_respond(request.ai_active, request.ai_paused_until),
        "currently_paused": service.policy().is_currently_paused(request.ai_paused_until, now),
        "evaluated_at": now
    }))
}
