// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, info, warn};

use crate::models::{AppointmentStatus, SchedulingError};

#[derive(Debug, Default, Clone, Copy)]
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), SchedulingError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if !self.get_valid_transitions(current_status).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(SchedulingError::InvalidStatusTransition {
                from: current_status,
                to: new_status,
            });
        }

        info!("Status transition validated: {} -> {}", current_status, new_status);
        Ok(())
    }

    /// Get all valid next statuses for a given current status.
    /// Staying in a non-terminal status is allowed so notes can be updated.
    pub fn get_valid_transitions(&self, current_status: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Scheduled => vec![
                AppointmentStatus::Scheduled,
                AppointmentStatus::Confirmed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::Confirmed => vec![
                AppointmentStatus::Confirmed,
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            // Terminal states - no transitions allowed
            AppointmentStatus::Completed => vec![],
            AppointmentStatus::Cancelled => vec![],
            AppointmentStatus::NoShow => vec![],
        }
    }

    /// Reschedules keep the status, so only the terminal guard applies.
    pub fn ensure_reschedulable(&self, current_status: AppointmentStatus) -> Result<(), SchedulingError> {
        if current_status.is_terminal() {
            warn!("Reschedule attempted on terminal appointment ({})", current_status);
            return Err(SchedulingError::validation(
                "status",
                format!("{} appointments cannot be rescheduled", current_status),
            ));
        }
        Ok(())
    }

    /// Statuses a brand new appointment may start in.
    pub fn validate_initial_status(&self, status: AppointmentStatus) -> Result<(), SchedulingError> {
        match status {
            AppointmentStatus::Scheduled | AppointmentStatus::Confirmed => Ok(()),
            other => Err(SchedulingError::validation(
                "status",
                format!("new appointments cannot start as {}", other),
            )),
        }
    }
}
