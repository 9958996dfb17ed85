pub mod availability;
pub mod booking;
pub mod calendar;
pub mod conflict;
pub mod lifecycle;
pub mod locking;
pub mod validation;

pub use availability::{AvailabilityService, WorkWindow};
pub use booking::{AppointmentBookingService, SchedulingDeps, SchedulingSettings};
pub use calendar::CalendarPolicyService;
pub use conflict::ConflictDetectionService;
pub use lifecycle::AppointmentLifecycleService;
pub use locking::ProfessionalLocks;
