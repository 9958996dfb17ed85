// libs/appointment-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Appointment, AvailabilitySlot, ClinicSchedulePolicy};
use crate::services::calendar::CalendarPolicyService;
use crate::services::conflict::find_overlapping;
use crate::store::{AppointmentStore, StoreError};

/// Smallest step the generator will use.
pub const MIN_SLOT_INCREMENT_MINUTES: u32 = 15;

/// Working-hours window slots are generated within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Steps through `window` and flags every candidate start.
///
/// Returns nothing on non-working days. A slot is kept only while
/// `start + duration <= window.end`; it is unavailable when it overlaps a
/// blocking appointment in `existing` or starts inside the lunch break.
pub fn generate_slots(
    policy: &ClinicSchedulePolicy,
    date: NaiveDate,
    existing: &[Appointment],
    duration_minutes: i32,
    window: WorkWindow,
    increment_minutes: u32,
) -> Vec<AvailabilitySlot> {
    if !policy.is_working_day(date) || duration_minutes <= 0 {
        return Vec::new();
    }

    let step = Duration::minutes(increment_minutes.max(MIN_SLOT_INCREMENT_MINUTES) as i64);
    let duration = Duration::minutes(duration_minutes as i64);
    let window_end = date.and_time(window.end);

    let mut slots = Vec::new();
    let mut cursor = date.and_time(window.start);

    while cursor + duration <= window_end {
        let slot_end = cursor + duration;
        let blocked = !find_overlapping(existing, cursor, slot_end, None).is_empty();
        let at_lunch = policy.is_lunch_conflict(cursor.time());

        slots.push(AvailabilitySlot {
            time: cursor.time(),
            end_time: slot_end.time(),
            duration_minutes,
            available: !blocked && !at_lunch,
        });

        cursor += step;
    }

    slots
}

pub struct AvailabilityService {
    calendar: Arc<CalendarPolicyService>,
    store: Arc<dyn AppointmentStore>,
    increment_minutes: u32,
}

impl AvailabilityService {
    pub fn new(
        calendar: Arc<CalendarPolicyService>,
        store: Arc<dyn AppointmentStore>,
        increment_minutes: u32,
    ) -> Self {
        if increment_minutes < MIN_SLOT_INCREMENT_MINUTES {
            warn!("Slot increment of {} minutes is below the {} minute floor, clamping",
                  increment_minutes, MIN_SLOT_INCREMENT_MINUTES);
        }
        Self {
            calendar,
            store,
            increment_minutes: increment_minutes.max(MIN_SLOT_INCREMENT_MINUTES),
        }
    }

    pub fn increment_minutes(&self) -> u32 {
        self.increment_minutes
    }

    pub async fn get_available_slots(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        date: NaiveDate,
        duration_minutes: i32,
        window: WorkWindow,
    ) -> Result<Vec<AvailabilitySlot>, StoreError> {
        debug!("Generating slots for professional {} on {} ({} min)",
               professional_id, date, duration_minutes);

        let policy = self.calendar.resolve(clinic_id).await;
        if !policy.is_working_day(date) {
            debug!("{} is not a working day for clinic {}", date, clinic_id);
            return Ok(Vec::new());
        }

        let existing = self.store.professional_day(clinic_id, professional_id, date).await?;

        Ok(generate_slots(&policy, date, &existing, duration_minutes, window, self.increment_minutes))
    }

    /// Bookable alternatives for a rejected request, best effort.
    ///
    /// Searches the clinic's own working hours. The rejected start time is
    /// left out, and so is the appointment being moved when rescheduling.
    /// A store failure yields no suggestions.
    #[allow(clippy::too_many_arguments)]
    pub async fn suggest_alternatives(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        date: NaiveDate,
        duration_minutes: i32,
        rejected_start: NaiveTime,
        exclude_appointment_id: Option<Uuid>,
        limit: usize,
    ) -> Vec<AvailabilitySlot> {
        let policy = self.calendar.resolve(clinic_id).await;
        let window = WorkWindow { start: policy.work_start, end: policy.work_end };

        let existing = match self.store.professional_day(clinic_id, professional_id, date).await {
            Ok(day) => day,
            Err(e) => {
                warn!("Could not compute alternative slots for professional {}: {}", professional_id, e);
                return Vec::new();
            }
        };
        let existing: Vec<Appointment> = existing.into_iter()
            .filter(|apt| Some(apt.id) != exclude_appointment_id)
            .collect();

        generate_slots(&policy, date, &existing, duration_minutes, window, self.increment_minutes)
            .into_iter()
            .filter(|slot| slot.available && slot.time != rejected_start)
            .take(limit)
            .collect()
    }
}
