// libs/appointment-cell/src/store/memory.rs
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentFilters, ClinicSchedulePolicy, Pagination};
use crate::services::conflict::find_overlapping;
use crate::store::{
    AppointmentStore, ClinicConfigStore, ContactDirectory, ProfessionalDirectory, StoreError,
    TagDirectory,
};

#[derive(Default)]
struct MemoryState {
    appointments: HashMap<Uuid, Appointment>,
    contacts: HashSet<(Uuid, Uuid)>,
    professionals: HashMap<(Uuid, Uuid), bool>,
    tags: HashSet<(Uuid, Uuid)>,
    policies: HashMap<Uuid, ClinicSchedulePolicy>,
}

/// Process-local store. Rejects overlapping blocking bookings on write,
/// mirroring the exclusion constraint of the relational schema.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
    unavailable: AtomicBool,
    config_lookup_failing: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_contact(&self, clinic_id: Uuid, contact_id: Uuid) {
        self.state.write().await.contacts.insert((clinic_id, contact_id));
    }

    pub async fn add_professional(&self, clinic_id: Uuid, user_id: Uuid, active: bool) {
        self.state.write().await.professionals.insert((clinic_id, user_id), active);
    }

    pub async fn add_tag(&self, clinic_id: Uuid, tag_id: Uuid) {
        self.state.write().await.tags.insert((clinic_id, tag_id));
    }

    pub async fn set_policy(&self, clinic_id: Uuid, policy: ClinicSchedulePolicy) {
        self.state.write().await.policies.insert(clinic_id, policy);
    }

    /// Simulates an outage of the whole store.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Simulates failing clinic-settings lookups only.
    pub fn fail_config_lookups(&self, failing: bool) {
        self.config_lookup_failing.store(failing, Ordering::SeqCst);
    }

    pub async fn appointment_count(&self) -> usize {
        self.state.read().await.appointments.len()
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store marked unavailable".to_string()));
        }
        Ok(())
    }

    fn overlaps_existing(state: &MemoryState, candidate: &Appointment) -> bool {
        if !candidate.blocks_schedule() {
            return false;
        }
        // Bookings may run past midnight, so every date is compared.
        let professional: Vec<Appointment> = state.appointments.values()
            .filter(|a| a.clinic_id == candidate.clinic_id
                && a.professional_id == candidate.professional_id)
            .cloned()
            .collect();

        !find_overlapping(&professional, candidate.starts_at(), candidate.ends_at(), Some(candidate.id))
            .is_empty()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryStore {
    async fn insert(&self, appointment: &Appointment) -> Result<Appointment, StoreError> {
        self.ensure_available()?;
        let mut state = self.state.write().await;

        if Self::overlaps_existing(&state, appointment) {
            return Err(StoreError::Overlap);
        }

        state.appointments.insert(appointment.id, appointment.clone());
        debug!("Stored appointment {} in memory", appointment.id);
        Ok(appointment.clone())
    }

    async fn update(&self, appointment: &Appointment) -> Result<Appointment, StoreError> {
        self.ensure_available()?;
        let mut state = self.state.write().await;

        let owned_by_clinic = state.appointments.get(&appointment.id)
            .is_some_and(|existing| existing.clinic_id == appointment.clinic_id);
        if !owned_by_clinic {
            return Err(StoreError::Unavailable(format!(
                "appointment {} vanished during update",
                appointment.id
            )));
        }

        if Self::overlaps_existing(&state, appointment) {
            return Err(StoreError::Overlap);
        }

        state.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment.clone())
    }

    async fn find(&self, clinic_id: Uuid, appointment_id: Uuid)
        -> Result<Option<Appointment>, StoreError> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.appointments.get(&appointment_id)
            .filter(|a| a.clinic_id == clinic_id)
            .cloned())
    }

    async fn professional_day(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError> {
        self.ensure_available()?;
        let state = self.state.read().await;
        let mut day: Vec<Appointment> = state.appointments.values()
            .filter(|a| a.clinic_id == clinic_id
                && a.professional_id == professional_id
                && a.scheduled_date == date)
            .cloned()
            .collect();
        day.sort_by_key(|a| a.scheduled_time);
        Ok(day)
    }

    async fn professional_between(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError> {
        self.ensure_available()?;
        let state = self.state.read().await;
        let mut window: Vec<Appointment> = state.appointments.values()
            .filter(|a| a.clinic_id == clinic_id
                && a.professional_id == professional_id
                && (from..=to).contains(&a.scheduled_date))
            .cloned()
            .collect();
        window.sort_by_key(|a| a.starts_at());
        Ok(window)
    }

    async fn list(
        &self,
        clinic_id: Uuid,
        filters: &AppointmentFilters,
        pagination: Pagination,
    ) -> Result<Vec<Appointment>, StoreError> {
        self.ensure_available()?;
        let state = self.state.read().await;
        let mut matching: Vec<Appointment> = state.appointments.values()
            .filter(|a| a.clinic_id == clinic_id && filters.matches(a))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.starts_at().cmp(&b.starts_at()).then(a.id.cmp(&b.id)));

        Ok(matching.into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect())
    }
}

#[async_trait]
impl ContactDirectory for InMemoryStore {
    async fn exists(&self, contact_id: Uuid, clinic_id: Uuid) -> Result<bool, StoreError> {
        self.ensure_available()?;
        Ok(self.state.read().await.contacts.contains(&(clinic_id, contact_id)))
    }
}

#[async_trait]
impl ProfessionalDirectory for InMemoryStore {
    async fn is_active_in_clinic(&self, user_id: Uuid, clinic_id: Uuid) -> Result<bool, StoreError> {
        self.ensure_available()?;
        Ok(self.state.read().await.professionals
            .get(&(clinic_id, user_id))
            .copied()
            .unwrap_or(false))
    }
}

#[async_trait]
impl TagDirectory for InMemoryStore {
    async fn exists(&self, tag_id: Uuid, clinic_id: Uuid) -> Result<bool, StoreError> {
        self.ensure_available()?;
        Ok(self.state.read().await.tags.contains(&(clinic_id, tag_id)))
    }
}

#[async_trait]
impl ClinicConfigStore for InMemoryStore {
    async fn get_schedule_policy(&self, clinic_id: Uuid)
        -> Result<Option<ClinicSchedulePolicy>, StoreError> {
        self.ensure_available()?;
        if self.config_lookup_failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("clinic settings lookup failed".to_string()));
        }
        Ok(self.state.read().await.policies.get(&clinic_id).cloned())
    }
}
