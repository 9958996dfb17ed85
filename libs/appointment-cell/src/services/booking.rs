// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_utils::Clock;

use crate::models::{
    Appointment, AppointmentFilters, AppointmentStatus, AvailabilityQuery, AvailabilitySlot,
    CancelAppointmentRequest, CreateAppointmentRequest, EntityKind, Pagination,
    RescheduleAppointmentRequest, SchedulingError, UpdateStatusRequest,
};
use crate::services::availability::{AvailabilityService, WorkWindow};
use crate::services::calendar::CalendarPolicyService;
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::locking::ProfessionalLocks;
use crate::services::validation::{parse_date, parse_time, validate_duration, validate_payment_amount};
use crate::store::{
    AppointmentStore, ClinicConfigStore, ContactDirectory, InMemoryStore, ProfessionalDirectory,
    StoreError, SupabaseSchedulingStore, TagDirectory,
};

/// Tunables of the scheduling engine.
#[derive(Debug, Clone)]
pub struct SchedulingSettings {
    pub slot_increment_minutes: u32,
    pub max_suggested_slots: usize,
    pub default_window: WorkWindow,
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self {
            slot_increment_minutes: 30,
            max_suggested_slots: 5,
            default_window: WorkWindow {
                start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
                end: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
            },
        }
    }
}

impl SchedulingSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let defaults = Self::default();

        let start = parse_time("default_work_start", &config.default_work_start)
            .unwrap_or_else(|e| {
                warn!("{} - using {}", e, defaults.default_window.start.format("%H:%M"));
                defaults.default_window.start
            });
        let end = parse_time("default_work_end", &config.default_work_end)
            .unwrap_or_else(|e| {
                warn!("{} - using {}", e, defaults.default_window.end.format("%H:%M"));
                defaults.default_window.end
            });

        Self {
            slot_increment_minutes: config.slot_increment_minutes,
            max_suggested_slots: config.max_suggested_slots,
            default_window: WorkWindow { start, end },
        }
    }
}

/// Collaborators the booking service is built from.
#[derive(Clone)]
pub struct SchedulingDeps {
    pub appointments: Arc<dyn AppointmentStore>,
    pub contacts: Arc<dyn ContactDirectory>,
    pub professionals: Arc<dyn ProfessionalDirectory>,
    pub tags: Arc<dyn TagDirectory>,
    pub clinic_config: Arc<dyn ClinicConfigStore>,
    pub clock: Arc<dyn Clock>,
}

impl SchedulingDeps {
    pub fn in_memory(store: Arc<InMemoryStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            appointments: store.clone(),
            contacts: store.clone(),
            professionals: store.clone(),
            tags: store.clone(),
            clinic_config: store,
            clock,
        }
    }

    pub fn supabase(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(SupabaseSchedulingStore::new(config));
        Self {
            appointments: store.clone(),
            contacts: store.clone(),
            professionals: store.clone(),
            tags: store.clone(),
            clinic_config: store,
            clock,
        }
    }
}

/// Orchestrates appointment create, reschedule, status and cancel flows:
/// validation, then calendar policy, then conflict check, then write.
pub struct AppointmentBookingService {
    store: Arc<dyn AppointmentStore>,
    contacts: Arc<dyn ContactDirectory>,
    professionals: Arc<dyn ProfessionalDirectory>,
    tags: Arc<dyn TagDirectory>,
    clock: Arc<dyn Clock>,
    calendar: Arc<CalendarPolicyService>,
    conflict_service: ConflictDetectionService,
    availability_service: AvailabilityService,
    lifecycle_service: AppointmentLifecycleService,
    locks: ProfessionalLocks,
    settings: SchedulingSettings,
}

impl AppointmentBookingService {
    pub fn new(deps: SchedulingDeps, settings: SchedulingSettings) -> Self {
        let calendar = Arc::new(CalendarPolicyService::new(deps.clinic_config));
        let conflict_service = ConflictDetectionService::new(Arc::clone(&deps.appointments));
        let availability_service = AvailabilityService::new(
            Arc::clone(&calendar),
            Arc::clone(&deps.appointments),
            settings.slot_increment_minutes,
        );

        Self {
            store: deps.appointments,
            contacts: deps.contacts,
            professionals: deps.professionals,
            tags: deps.tags,
            clock: deps.clock,
            calendar,
            conflict_service,
            availability_service,
            lifecycle_service: AppointmentLifecycleService::new(),
            locks: ProfessionalLocks::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &SchedulingSettings {
        &self.settings
    }

    #[instrument(skip(self, request), fields(professional_id = %request.professional_id))]
    pub async fn create_appointment(
        &self,
        clinic_id: Uuid,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        info!("Creating appointment in clinic {} for contact {}", clinic_id, request.contact_id);

        // **Step 1: Input shape**
        let date = parse_date("scheduled_date", &request.scheduled_date)?;
        let time = parse_time("scheduled_time", &request.scheduled_time)?;
        let duration_minutes = validate_duration(request.duration_minutes)?;
        let status = request.status.unwrap_or(AppointmentStatus::Scheduled);
        self.lifecycle_service.validate_initial_status(status)?;
        validate_payment_amount(request.payment_amount)?;

        // **Step 2: Referenced entities belong to the clinic**
        self.verify_references(clinic_id, request.contact_id, request.professional_id, request.tag_id)
            .await?;

        // **Step 3: Clinic calendar**
        self.check_calendar_policy(clinic_id, date, time).await?;

        // **Step 4: Conflict check and insert for this professional, serialized**
        let _guard = self.locks.acquire(clinic_id, request.professional_id).await;

        self.ensure_no_conflicts(clinic_id, request.professional_id, date, time, duration_minutes, None)
            .await?;

        let now = self.clock.now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            contact_id: request.contact_id,
            clinic_id,
            professional_id: request.professional_id,
            scheduled_date: date,
            scheduled_time: time,
            duration_minutes,
            status,
            tag_id: request.tag_id,
            payment_status: request.payment_status,
            payment_amount: request.payment_amount,
            cancellation_reason: None,
            cancelled_by: None,
            session_notes: request.session_notes,
            created_at: now,
            updated_at: now,
        };

        let stored = match self.store.insert(&appointment).await {
            Ok(stored) => stored,
            Err(StoreError::Overlap) => {
                return Err(self.overlap_rejection(
                    clinic_id, request.professional_id, date, time, duration_minutes, None,
                ).await);
            }
            Err(e) => return Err(e.into()),
        };

        info!("Appointment {} created for professional {} on {} at {}",
              stored.id, stored.professional_id, stored.scheduled_date, stored.scheduled_time);
        Ok(stored)
    }

    #[instrument(skip(self, request))]
    pub async fn reschedule_appointment(
        &self,
        clinic_id: Uuid,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        info!("Rescheduling appointment {} in clinic {}", appointment_id, clinic_id);

        let date = parse_date("scheduled_date", &request.scheduled_date)?;
        let time = parse_time("scheduled_time", &request.scheduled_time)?;
        let requested_duration = request.duration_minutes.map(validate_duration).transpose()?;

        let (mut appointment, _guard) = self.load_locked(clinic_id, appointment_id).await?;
        self.lifecycle_service.ensure_reschedulable(appointment.status)?;

        if let Some(status) = request.status {
            self.lifecycle_service.validate_status_transition(appointment.status, status)?;
            if status.is_terminal() {
                return Err(SchedulingError::validation(
                    "status",
                    format!("a reschedule cannot also move the appointment to {}", status),
                ));
            }
        }

        let duration_minutes = requested_duration.unwrap_or(appointment.duration_minutes);

        self.check_calendar_policy(clinic_id, date, time).await?;
        self.ensure_no_conflicts(
            clinic_id, appointment.professional_id, date, time, duration_minutes, Some(appointment.id),
        ).await?;

        appointment.scheduled_date = date;
        appointment.scheduled_time = time;
        appointment.duration_minutes = duration_minutes;
        if let Some(status) = request.status {
            appointment.status = status;
        }
        appointment.updated_at = self.clock.now();

        let stored = match self.store.update(&appointment).await {
            Ok(stored) => stored,
            Err(StoreError::Overlap) => {
                return Err(self.overlap_rejection(
                    clinic_id, appointment.professional_id, date, time, duration_minutes, Some(appointment.id),
                ).await);
            }
            Err(e) => return Err(e.into()),
        };

        info!("Appointment {} moved to {} {} ({} min)",
              stored.id, stored.scheduled_date, stored.scheduled_time, stored.duration_minutes);
        Ok(stored)
    }

    #[instrument(skip(self, request))]
    pub async fn update_appointment_status(
        &self,
        clinic_id: Uuid,
        appointment_id: Uuid,
        request: UpdateStatusRequest,
    ) -> Result<Appointment, SchedulingError> {
        let (mut appointment, _guard) = self.load_locked(clinic_id, appointment_id).await?;

        self.lifecycle_service.validate_status_transition(appointment.status, request.status)?;

        appointment.status = request.status;
        if let Some(notes) = request.notes {
            appointment.session_notes = Some(notes);
        }
        appointment.updated_at = self.clock.now();

        let stored = self.store.update(&appointment).await?;
        info!("Appointment {} status is now {}", stored.id, stored.status);
        Ok(stored)
    }

    #[instrument(skip(self, request))]
    pub async fn cancel_appointment(
        &self,
        clinic_id: Uuid,
        appointment_id: Uuid,
        request: CancelAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        let (mut appointment, _guard) = self.load_locked(clinic_id, appointment_id).await?;

        self.lifecycle_service
            .validate_status_transition(appointment.status, AppointmentStatus::Cancelled)?;

        appointment.status = AppointmentStatus::Cancelled;
        appointment.cancelled_by = Some(request.cancelled_by);
        appointment.cancellation_reason = request.reason;
        appointment.updated_at = self.clock.now();

        let stored = self.store.update(&appointment).await?;
        info!("Appointment {} cancelled by {}", stored.id, request.cancelled_by);
        Ok(stored)
    }

    pub async fn get_appointment(
        &self,
        clinic_id: Uuid,
        appointment_id: Uuid,
    ) -> Result<Appointment, SchedulingError> {
        self.load(clinic_id, appointment_id).await
    }

    pub async fn list_appointments(
        &self,
        clinic_id: Uuid,
        filters: AppointmentFilters,
        pagination: Pagination,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        if let (Some(from), Some(to)) = (filters.date_from, filters.date_to) {
            if from > to {
                return Err(SchedulingError::validation("date_from", "must not be after date_to"));
            }
        }

        debug!("Listing appointments for clinic {} (limit {}, offset {})",
               clinic_id, pagination.limit(), pagination.offset());
        Ok(self.store.list(clinic_id, &filters, pagination).await?)
    }

    pub async fn get_available_slots(
        &self,
        clinic_id: Uuid,
        query: AvailabilityQuery,
    ) -> Result<Vec<AvailabilitySlot>, SchedulingError> {
        let date = parse_date("date", &query.date)?;
        let duration_minutes = validate_duration(query.duration_minutes)?;

        let start = match query.work_start.as_deref() {
            Some(raw) => parse_time("work_start", raw)?,
            None => self.settings.default_window.start,
        };
        let end = match query.work_end.as_deref() {
            Some(raw) => parse_time("work_end", raw)?,
            None => self.settings.default_window.end,
        };
        if start >= end {
            return Err(SchedulingError::validation("work_end", "must be after work_start"));
        }

        Ok(self.availability_service.get_available_slots(
            clinic_id,
            query.professional_id,
            date,
            duration_minutes,
            WorkWindow { start, end },
        ).await?)
    }

    // ==============================================================================
    // PRIVATE HELPER METHODS
    // ==============================================================================

    async fn load(&self, clinic_id: Uuid, appointment_id: Uuid) -> Result<Appointment, SchedulingError> {
        self.store.find(clinic_id, appointment_id).await?
            .ok_or(SchedulingError::NotFound(EntityKind::Appointment))
    }

    /// Loads the appointment, takes its professional's lock and re-reads it
    /// so the caller mutates the latest row.
    async fn load_locked(
        &self,
        clinic_id: Uuid,
        appointment_id: Uuid,
    ) -> Result<(Appointment, OwnedMutexGuard<()>), SchedulingError> {
        let professional_id = self.load(clinic_id, appointment_id).await?.professional_id;
        let guard = self.locks.acquire(clinic_id, professional_id).await;
        let fresh = self.load(clinic_id, appointment_id).await?;
        Ok((fresh, guard))
    }

    async fn verify_references(
        &self,
        clinic_id: Uuid,
        contact_id: Uuid,
        professional_id: Uuid,
        tag_id: Option<Uuid>,
    ) -> Result<(), SchedulingError> {
        if !self.contacts.exists(contact_id, clinic_id).await? {
            warn!("Contact {} not found in clinic {}", contact_id, clinic_id);
            return Err(SchedulingError::NotFound(EntityKind::Contact));
        }

        if !self.professionals.is_active_in_clinic(professional_id, clinic_id).await? {
            warn!("Professional {} not active in clinic {}", professional_id, clinic_id);
            return Err(SchedulingError::NotFound(EntityKind::Professional));
        }

        if let Some(tag_id) = tag_id {
            if !self.tags.exists(tag_id, clinic_id).await? {
                warn!("Tag {} not found in clinic {}", tag_id, clinic_id);
                return Err(SchedulingError::NotFound(EntityKind::Tag));
            }
        }

        Ok(())
    }

    async fn check_calendar_policy(
        &self,
        clinic_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<(), SchedulingError> {
        let policy = self.calendar.resolve(clinic_id).await;
        match policy.violation_for(date, time) {
            Some(rule) => {
                warn!("Clinic {} rejects {} {}: {}", clinic_id, date, time, rule);
                Err(SchedulingError::PolicyViolation(rule))
            }
            None => Ok(()),
        }
    }

    async fn ensure_no_conflicts(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        duration_minutes: i32,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<(), SchedulingError> {
        let start = date.and_time(time);
        let end = start + Duration::minutes(duration_minutes as i64);

        let conflicting_appointments = self.conflict_service
            .find_conflicts(clinic_id, professional_id, start, end, exclude_appointment_id)
            .await?;

        if conflicting_appointments.is_empty() {
            return Ok(());
        }

        let suggested_slots = self.availability_service.suggest_alternatives(
            clinic_id,
            professional_id,
            date,
            duration_minutes,
            time,
            exclude_appointment_id,
            self.settings.max_suggested_slots,
        ).await;

        Err(SchedulingError::Conflict { conflicting_appointments, suggested_slots })
    }

    /// The store refused an overlap our own check did not see (another
    /// process won the race). Rebuild the conflict answer from fresh data.
    async fn overlap_rejection(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        duration_minutes: i32,
        exclude_appointment_id: Option<Uuid>,
    ) -> SchedulingError {
        warn!("Store rejected overlapping booking for professional {} on {} at {}",
              professional_id, date, time);

        match self.ensure_no_conflicts(
            clinic_id, professional_id, date, time, duration_minutes, exclude_appointment_id,
        ).await {
            Err(err) => err,
            Ok(()) => SchedulingError::Conflict {
                conflicting_appointments: Vec::new(),
                suggested_slots: Vec::new(),
            },
        }
    }
}
