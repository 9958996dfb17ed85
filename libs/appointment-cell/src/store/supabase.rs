// libs/appointment-cell/src/store/supabase.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{SupabaseClient, SupabaseError};

use crate::models::{Appointment, AppointmentFilters, ClinicSchedulePolicy, Pagination};
use crate::store::{
    AppointmentStore, ClinicConfigStore, ContactDirectory, ProfessionalDirectory, StoreError,
    TagDirectory,
};

/// SQLSTATE raised by the `appointments_no_overlap` exclusion constraint.
const EXCLUSION_VIOLATION: &str = "23P01";

pub struct SupabaseSchedulingStore {
    supabase: Arc<SupabaseClient>,
    service_token: Option<String>,
}

/// Nullable view of a `clinics` row; gaps fall back to the default policy.
#[derive(Debug, Deserialize)]
struct ClinicPolicyRow {
    working_days: Option<Vec<u8>>,
    lunch_break_enabled: Option<bool>,
    lunch_start: Option<NaiveTime>,
    lunch_end: Option<NaiveTime>,
    work_start: Option<NaiveTime>,
    work_end: Option<NaiveTime>,
}

impl From<ClinicPolicyRow> for ClinicSchedulePolicy {
    fn from(row: ClinicPolicyRow) -> Self {
        let fallback = ClinicSchedulePolicy::fallback();
        ClinicSchedulePolicy {
            working_days: row.working_days.unwrap_or(fallback.working_days),
            lunch_break_enabled: row.lunch_break_enabled.unwrap_or(false),
            lunch_start: row.lunch_start,
            lunch_end: row.lunch_end,
            work_start: row.work_start.unwrap_or(fallback.work_start),
            work_end: row.work_end.unwrap_or(fallback.work_end),
        }
    }
}

impl SupabaseSchedulingStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            service_token: config.service_token().map(str::to_string),
        }
    }

    fn token(&self) -> Option<&str> {
        self.service_token.as_deref()
    }

    async fn fetch_rows(&self, path: &str) -> Result<Vec<Value>, StoreError> {
        self.supabase.request::<Vec<Value>>(Method::GET, path, self.token(), None)
            .await
            .map_err(map_supabase_error)
    }

    async fn fetch_appointments(&self, path: &str) -> Result<Vec<Appointment>, StoreError> {
        let rows = self.fetch_rows(path).await?;
        parse_appointments(rows)
    }

    async fn row_exists(&self, path: &str) -> Result<bool, StoreError> {
        Ok(!self.fetch_rows(path).await?.is_empty())
    }
}

fn map_supabase_error(error: SupabaseError) -> StoreError {
    if error.sql_state() == Some(EXCLUSION_VIOLATION) {
        warn!("Store rejected overlapping booking: {}", error);
        return StoreError::Overlap;
    }
    match error {
        SupabaseError::Decode(msg) => StoreError::Decode(msg),
        other => StoreError::Unavailable(other.to_string()),
    }
}

fn parse_appointments(rows: Vec<Value>) -> Result<Vec<Appointment>, StoreError> {
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<Appointment>, _>>()
        .map_err(|e| StoreError::Decode(format!("Failed to parse appointments: {}", e)))
}

fn first_appointment(rows: Vec<Value>, context: &str) -> Result<Appointment, StoreError> {
    parse_appointments(rows)?
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::Unavailable(format!("{} returned no rows", context)))
}

fn mutable_fields(appointment: &Appointment) -> Value {
    json!({
        "scheduled_date": appointment.scheduled_date,
        "scheduled_time": appointment.scheduled_time,
        "duration_minutes": appointment.duration_minutes,
        "status": appointment.status,
        "tag_id": appointment.tag_id,
        "payment_status": appointment.payment_status,
        "payment_amount": appointment.payment_amount,
        "cancellation_reason": appointment.cancellation_reason,
        "cancelled_by": appointment.cancelled_by,
        "session_notes": appointment.session_notes,
        "updated_at": appointment.updated_at,
    })
}

fn list_path(clinic_id: Uuid, filters: &AppointmentFilters, pagination: Pagination) -> String {
    let mut query_parts = vec![format!("clinic_id=eq.{}", clinic_id)];

    if let Some(professional_id) = filters.professional_id {
        query_parts.push(format!("professional_id=eq.{}", professional_id));
    }
    if let Some(contact_id) = filters.contact_id {
        query_parts.push(format!("contact_id=eq.{}", contact_id));
    }
    if let Some(status) = filters.status {
        query_parts.push(format!("status=eq.{}", status));
    }
    if let Some(from) = filters.date_from {
        query_parts.push(format!("scheduled_date=gte.{}", from));
    }
    if let Some(to) = filters.date_to {
        query_parts.push(format!("scheduled_date=lte.{}", to));
    }
    query_parts.push("order=scheduled_date.asc,scheduled_time.asc".to_string());
    query_parts.push(format!("limit={}", pagination.limit()));
    query_parts.push(format!("offset={}", pagination.offset()));

    format!("/rest/v1/appointments?{}", query_parts.join("&"))
}

#[async_trait]
impl AppointmentStore for SupabaseSchedulingStore {
    async fn insert(&self, appointment: &Appointment) -> Result<Appointment, StoreError> {
        let body = serde_json::to_value(appointment)
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        let rows: Vec<Value> = self.supabase.request_returning(
            Method::POST,
            "/rest/v1/appointments",
            self.token(),
            body,
        ).await.map_err(map_supabase_error)?;

        debug!("Inserted appointment {}", appointment.id);
        first_appointment(rows, "appointment insert")
    }

    async fn update(&self, appointment: &Appointment) -> Result<Appointment, StoreError> {
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&clinic_id=eq.{}",
            appointment.id, appointment.clinic_id
        );

        let rows: Vec<Value> = self.supabase.request_returning(
            Method::PATCH,
            &path,
            self.token(),
            mutable_fields(appointment),
        ).await.map_err(map_supabase_error)?;

        first_appointment(rows, "appointment update")
    }

    async fn find(&self, clinic_id: Uuid, appointment_id: Uuid)
        -> Result<Option<Appointment>, StoreError> {
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&clinic_id=eq.{}&limit=1",
            appointment_id, clinic_id
        );
        Ok(self.fetch_appointments(&path).await?.into_iter().next())
    }

    async fn professional_day(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError> {
        let path = format!(
            "/rest/v1/appointments?clinic_id=eq.{}&professional_id=eq.{}&scheduled_date=eq.{}&order=scheduled_time.asc",
            clinic_id, professional_id, date
        );
        self.fetch_appointments(&path).await
    }

    async fn professional_between(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError> {
        let path = format!(
            "/rest/v1/appointments?clinic_id=eq.{}&professional_id=eq.{}&scheduled_date=gte.{}&scheduled_date=lte.{}&order=scheduled_date.asc,scheduled_time.asc",
            clinic_id, professional_id, from, to
        );
        self.fetch_appointments(&path).await
    }

    async fn list(
        &self,
        clinic_id: Uuid,
        filters: &AppointmentFilters,
        pagination: Pagination,
    ) -> Result<Vec<Appointment>, StoreError> {
        self.fetch_appointments(&list_path(clinic_id, filters, pagination)).await
    }
}

#[async_trait]
impl ContactDirectory for SupabaseSchedulingStore {
    async fn exists(&self, contact_id: Uuid, clinic_id: Uuid) -> Result<bool, StoreError> {
        self.row_exists(&format!(
            "/rest/v1/contacts?id=eq.{}&clinic_id=eq.{}&select=id&limit=1",
            contact_id, clinic_id
        )).await
    }
}

#[async_trait]
impl ProfessionalDirectory for SupabaseSchedulingStore {
    async fn is_active_in_clinic(&self, user_id: Uuid, clinic_id: Uuid) -> Result<bool, StoreError> {
        self.row_exists(&format!(
            "/rest/v1/users?id=eq.{}&clinic_id=eq.{}&is_active=eq.true&select=id&limit=1",
            user_id, clinic_id
        )).await
    }
}

#[async_trait]
impl TagDirectory for SupabaseSchedulingStore {
    async fn exists(&self, tag_id: Uuid, clinic_id: Uuid) -> Result<bool, StoreError> {
        self.row_exists(&format!(
            "/rest/v1/tags?id=eq.{}&clinic_id=eq.{}&select=id&limit=1",
            tag_id, clinic_id
        )).await
    }
}

#[async_trait]
impl ClinicConfigStore for SupabaseSchedulingStore {
    async fn get_schedule_policy(&self, clinic_id: Uuid)
        -> Result<Option<ClinicSchedulePolicy>, StoreError> {
        let path = format!(
            "/rest/v1/clinics?id=eq.{}&select=working_days,lunch_break_enabled,lunch_start,lunch_end,work_start,work_end&limit=1",
            clinic_id
        );
        let rows = self.fetch_rows(&path).await?;

        match rows.into_iter().next() {
            Some(row) => {
                let row: ClinicPolicyRow = serde_json::from_value(row)
                    .map_err(|e| StoreError::Decode(format!("Failed to parse clinic settings: {}", e)))?;
                Ok(Some(row.into()))
            }
            None => Ok(None),
        }
    }
}
