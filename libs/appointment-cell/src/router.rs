// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::handlers;
use crate::services::booking::AppointmentBookingService;

const BASE: &str = "/clinics/{clinic_id}/appointments";

pub fn appointment_routes(service: Arc<AppointmentBookingService>) -> Router {
    Router::new()
        .route(BASE, post(handlers::create_appointment).get(handlers::list_appointments))
        .route(&format!("{BASE}/availability"), get(handlers::get_availability))
        .route(&format!("{BASE}/{{appointment_id}}"), get(handlers::get_appointment))
        .route(&format!("{BASE}/{{appointment_id}}/reschedule"), patch(handlers::reschedule_appointment))
        .route(&format!("{BASE}/{{appointment_id}}/status"), patch(handlers::update_appointment_status))
        .route(&format!("{BASE}/{{appointment_id}}/cancel"), post(handlers::cancel_appointment))
        .with_state(service)
}
