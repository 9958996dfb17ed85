// libs/appointment-cell/src/store/mod.rs
//
// Collaborator seams for the scheduling core. The booking service only talks
// to these traits; concrete stores are picked by the binary at startup.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentFilters, ClinicSchedulePolicy, Pagination};

pub mod memory;
pub mod supabase;

pub use memory::InMemoryStore;
pub use supabase::SupabaseSchedulingStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to decode stored row: {0}")]
    Decode(String),

    /// The store itself refused an overlapping booking.
    #[error("overlapping booking rejected by store")]
    Overlap,
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn insert(&self, appointment: &Appointment) -> Result<Appointment, StoreError>;

    async fn update(&self, appointment: &Appointment) -> Result<Appointment, StoreError>;

    /// Tenant-scoped lookup; a row from another clinic is `None`.
    async fn find(&self, clinic_id: Uuid, appointment_id: Uuid)
        -> Result<Option<Appointment>, StoreError>;

    /// Every appointment (any status) the professional has on `date`.
    async fn professional_day(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError>;

    /// Every appointment the professional has dated `from..=to`, ordered by
    /// date then time.
    async fn professional_between(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError>;

    /// Ordered by date then time, ascending.
    async fn list(
        &self,
        clinic_id: Uuid,
        filters: &AppointmentFilters,
        pagination: Pagination,
    ) -> Result<Vec<Appointment>, StoreError>;
}

#[async_trait]
pub trait ContactDirectory: Send + Sync {
    async fn exists(&self, contact_id: Uuid, clinic_id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ProfessionalDirectory: Send + Sync {
    async fn is_active_in_clinic(&self, user_id: Uuid, clinic_id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait TagDirectory: Send + Sync {
    async fn exists(&self, tag_id: Uuid, clinic_id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ClinicConfigStore: Send + Sync {
    async fn get_schedule_policy(&self, clinic_id: Uuid)
        -> Result<Option<ClinicSchedulePolicy>, StoreError>;
}
