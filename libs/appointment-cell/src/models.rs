// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use std::fmt;

use crate::store::StoreError;

pub const MIN_DURATION_MINUTES: i32 = 15;
pub const MAX_DURATION_MINUTES: i32 = 480;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub clinic_id: Uuid,
    pub professional_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    pub tag_id: Option<Uuid>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_amount: Option<f64>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<CancelledBy>,
    pub session_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Clinic-local start of the booking.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.scheduled_date.and_time(self.scheduled_time)
    }

    /// Exclusive end: `starts_at + duration`.
    pub fn ends_at(&self) -> NaiveDateTime {
        self.starts_at() + Duration::minutes(self.duration_minutes as i64)
    }

    pub fn blocks_schedule(&self) -> bool {
        self.status.blocks_schedule()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    NoShow,
    Cancelled,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self,
            AppointmentStatus::Completed |
            AppointmentStatus::Cancelled |
            AppointmentStatus::NoShow
        )
    }

    /// Cancelled and no-show bookings free their slot.
    pub fn blocks_schedule(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::NoShow)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::NoShow => "no_show",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CancelledBy {
    Patient,
    Professional,
}

impl fmt::Display for CancelledBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelledBy::Patient => write!(f, "patient"),
            CancelledBy::Professional => write!(f, "professional"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

// ==============================================================================
// CLINIC CONFIGURATION
// ==============================================================================

/// Per-clinic calendar rules. Owned by the clinic settings, read here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicSchedulePolicy {
    /// 0 = Sunday .. 6 = Saturday
    pub working_days: Vec<u8>,
    #[serde(default)]
    pub lunch_break_enabled: bool,
    pub lunch_start: Option<NaiveTime>,
    pub lunch_end: Option<NaiveTime>,
    #[serde(default = "default_work_start")]
    pub work_start: NaiveTime,
    #[serde(default = "default_work_end")]
    pub work_end: NaiveTime,
}

fn default_work_start() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_work_end() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN)
}

impl ClinicSchedulePolicy {
    /// Monday to Friday, no lunch break, 08:00-18:00.
    pub fn fallback() -> Self {
        Self {
            working_days: vec![1, 2, 3, 4, 5],
            lunch_break_enabled: false,
            lunch_start: None,
            lunch_end: None,
            work_start: default_work_start(),
            work_end: default_work_end(),
        }
    }

    pub fn with_lunch_break(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.lunch_break_enabled = true;
        self.lunch_start = Some(start);
        self.lunch_end = Some(end);
        self
    }

    pub fn works_on(&self, weekday: Weekday) -> bool {
        let day = weekday.num_days_from_sunday() as u8;
        self.working_days.contains(&day)
    }
}

impl Default for ClinicSchedulePolicy {
    fn default() -> Self {
        Self::fallback()
    }
}

// ==============================================================================
// AVAILABILITY MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilitySlot {
    pub time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub professional_id: Uuid,
    pub date: String,
    pub duration_minutes: i32,
    pub work_start: Option<String>,
    pub work_end: Option<String>,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub contact_id: Uuid,
    pub professional_id: Uuid,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub duration_minutes: i32,
    pub status: Option<AppointmentStatus>,
    pub tag_id: Option<Uuid>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_amount: Option<f64>,
    pub session_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub duration_minutes: Option<i32>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    pub cancelled_by: CancelledBy,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentFilters {
    pub professional_id: Option<Uuid>,
    pub contact_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl AppointmentFilters {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.professional_id.is_none_or(|id| appointment.professional_id == id)
            && self.contact_id.is_none_or(|id| appointment.contact_id == id)
            && self.status.is_none_or(|status| appointment.status == status)
            && self.date_from.is_none_or(|from| appointment.scheduled_date >= from)
            && self.date_to.is_none_or(|to| appointment.scheduled_date <= to)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u32 = 50;
    pub const MAX_LIMIT: u32 = 200;

    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Contact,
    Professional,
    Tag,
    Appointment,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Contact => write!(f, "Contact"),
            EntityKind::Professional => write!(f, "Professional"),
            EntityKind::Tag => write!(f, "Tag"),
            EntityKind::Appointment => write!(f, "Appointment"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum PolicyRule {
    NonWorkingDay { date: NaiveDate },
    LunchBreak { lunch_start: NaiveTime, lunch_end: NaiveTime },
}

impl fmt::Display for PolicyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyRule::NonWorkingDay { date } => {
                write!(f, "{} ({}) is not a working day", date, date.weekday())
            }
            PolicyRule::LunchBreak { lunch_start, lunch_end } => write!(
                f,
                "time falls within the lunch break ({} - {})",
                lunch_start.format("%H:%M"),
                lunch_end.format("%H:%M")
            ),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("Validation error on {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("{0} not found")]
    NotFound(EntityKind),

    #[error("Scheduling policy violation: {0}")]
    PolicyViolation(PolicyRule),

    #[error("Appointment conflicts with {} existing booking(s)", conflicting_appointments.len())]
    Conflict {
        conflicting_appointments: Vec<Appointment>,
        suggested_slots: Vec<AvailabilitySlot>,
    },

    #[error("Appointment cannot move from {from} to {to}")]
    InvalidStatusTransition { from: AppointmentStatus, to: AppointmentStatus },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl SchedulingError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        SchedulingError::Validation { field, message: message.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SchedulingError::Validation { .. } => "validation",
            SchedulingError::InvalidStatusTransition { .. } => "validation",
            SchedulingError::NotFound(_) => "not_found",
            SchedulingError::PolicyViolation(_) => "policy_violation",
            SchedulingError::Conflict { .. } => "conflict",
            SchedulingError::Store(_) => "internal",
        }
    }

    /// Everything except store failures is an expected business outcome.
    pub fn is_business(&self) -> bool {
        !matches!(self, SchedulingError::Store(_))
    }
}
