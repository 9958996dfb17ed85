// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    AppointmentFilters, AppointmentStatus, AvailabilityQuery, CancelAppointmentRequest,
    CreateAppointmentRequest, Pagination, RescheduleAppointmentRequest, SchedulingError,
    UpdateStatusRequest,
};
use crate::services::booking::AppointmentBookingService;
use crate::services::validation::parse_date;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ListAppointmentsQuery {
    pub professional_id: Option<Uuid>,
    pub contact_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListAppointmentsQuery {
    pub fn into_parts(self) -> Result<(AppointmentFilters, Pagination), SchedulingError> {
        let date_from = self.date_from.as_deref().map(|raw| parse_date("date_from", raw)).transpose()?;
        let date_to = self.date_to.as_deref().map(|raw| parse_date("date_to", raw)).transpose()?;

        let filters = AppointmentFilters {
            professional_id: self.professional_id,
            contact_id: self.contact_id,
            status: self.status,
            date_from,
            date_to,
        };
        let pagination = Pagination { limit: self.limit, offset: self.offset };

        Ok((filters, pagination))
    }
}

// ==============================================================================
// ERROR MAPPING
// ==============================================================================

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        let message = err.to_string();
        match err {
            SchedulingError::Validation { field, message } => AppError::ValidationError {
                field: field.to_string(),
                message,
            },
            SchedulingError::InvalidStatusTransition { from, to } => AppError::ValidationError {
                field: "status".to_string(),
                message: format!("cannot move from {} to {}", from, to),
            },
            SchedulingError::NotFound(_) => AppError::NotFound(message),
            SchedulingError::PolicyViolation(rule) => AppError::PolicyViolation {
                message,
                details: json!({ "policy": rule }),
            },
            SchedulingError::Conflict { conflicting_appointments, suggested_slots } => AppError::Conflict {
                message,
                details: json!({
                    "conflicting_appointments": conflicting_appointments,
                    "suggested_slots": suggested_slots,
                }),
            },
            SchedulingError::Store(e) => AppError::Database(e.to_string()),
        }
    }
}

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

pub async fn create_appointment(
    State(service): State<Arc<AppointmentBookingService>>,
    Path(clinic_id): Path<Uuid>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = service.create_appointment(clinic_id, request).await?;

    Ok((StatusCode::CREATED, Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment booked successfully"
    }))))
}

pub async fn list_appointments(
    State(service): State<Arc<AppointmentBookingService>>,
    Path(clinic_id): Path<Uuid>,
    Query(query): Query<ListAppointmentsQuery>,
) -> Result<Json<Value>, AppError> {
    let (filters, pagination) = query.into_parts()?;
    let appointments = service.list_appointments(clinic_id, filters, pagination).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len(),
        "limit": pagination.limit(),
        "offset": pagination.offset()
    })))
}

pub async fn get_appointment(
    State(service): State<Arc<AppointmentBookingService>>,
    Path((clinic_id, appointment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let appointment = service.get_appointment(clinic_id, appointment_id).await?;
    Ok(Json(json!(appointment)))
}

pub async fn get_availability(
    State(service): State<Arc<AppointmentBookingService>>,
    Path(clinic_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let professional_id = query.professional_id;
    let date = query.date.clone();
    let slots = service.get_available_slots(clinic_id, query).await?;
    let available = slots.iter().filter(|slot| slot.available).count();

    Ok(Json(json!({
        "professional_id": professional_id,
        "date": date,
        "slots": slots,
        "available_count": available
    })))
}

pub async fn reschedule_appointment(
    State(service): State<Arc<AppointmentBookingService>>,
    Path((clinic_id, appointment_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = service.reschedule_appointment(clinic_id, appointment_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment rescheduled successfully"
    })))
}

pub async fn update_appointment_status(
    State(service): State<Arc<AppointmentBookingService>>,
    Path((clinic_id, appointment_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = service.update_appointment_status(clinic_id, appointment_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

pub async fn cancel_appointment(
    State(service): State<Arc<AppointmentBookingService>>,
    Path((clinic_id, appointment_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = service.cancel_appointment(clinic_id, appointment_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment cancelled successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityKind, PolicyRule};
    use axum::response::IntoResponse;
    use chrono::NaiveDate;

    #[test]
    fn list_query_rejects_malformed_dates() {
        let query = ListAppointmentsQuery { date_from: Some("10/03/2025".to_string()), ..Default::default() };
        assert!(query.into_parts().is_err());
    }

    #[test]
    fn scheduling_errors_map_to_status_codes() {
        let not_found: AppError = SchedulingError::NotFound(EntityKind::Tag).into();
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let policy: AppError = SchedulingError::PolicyViolation(PolicyRule::NonWorkingDay {
            date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
        }).into();
        assert_eq!(policy.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);

        let conflict: AppError = SchedulingError::Conflict {
            conflicting_appointments: vec![],
            suggested_slots: vec![],
        }.into();
        assert_eq!(conflict.into_response().status(), StatusCode::CONFLICT);

        let transition: AppError = SchedulingError::InvalidStatusTransition {
            from: AppointmentStatus::Completed,
            to: AppointmentStatus::Scheduled,
        }.into();
        assert_eq!(transition.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
