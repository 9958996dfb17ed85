// libs/appointment-cell/src/services/conflict.rs
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::Appointment;
use crate::store::{AppointmentStore, StoreError};

/// Half-open intervals `[start1, end1)` and `[start2, end2)` overlap.
/// Touching endpoints do not.
pub fn intervals_overlap(
    start1: NaiveDateTime,
    end1: NaiveDateTime,
    start2: NaiveDateTime,
    end2: NaiveDateTime,
) -> bool {
    start1 < end2 && start2 < end1
}

/// Blocking appointments in `existing` that overlap `[start, end)`.
pub fn find_overlapping(
    existing: &[Appointment],
    start: NaiveDateTime,
    end: NaiveDateTime,
    exclude_appointment_id: Option<Uuid>,
) -> Vec<Appointment> {
    existing.iter()
        .filter(|apt| Some(apt.id) != exclude_appointment_id)
        .filter(|apt| apt.blocks_schedule())
        .filter(|apt| intervals_overlap(start, end, apt.starts_at(), apt.ends_at()))
        .cloned()
        .collect()
}

pub struct ConflictDetectionService {
    store: Arc<dyn AppointmentStore>,
}

impl ConflictDetectionService {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    /// Bookings of the professional that overlap the candidate interval.
    /// The previous day is loaded too, since a booking there may run past
    /// midnight into the candidate.
    pub async fn find_conflicts(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, StoreError> {
        debug!("Checking conflicts for professional {} from {} to {}",
               professional_id, start, end);

        let from = start.date().pred_opt().unwrap_or(start.date());
        let nearby = self.store
            .professional_between(clinic_id, professional_id, from, end.date())
            .await?;

        let conflicts = find_overlapping(&nearby, start, end, exclude_appointment_id);

        if !conflicts.is_empty() {
            warn!("Conflict detected for professional {} - {} conflicting appointments",
                  professional_id, conflicts.len());
        }

        Ok(conflicts)
    }
}
