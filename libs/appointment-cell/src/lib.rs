pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;

pub use router::appointment_routes;
pub use services::booking::{AppointmentBookingService, SchedulingDeps, SchedulingSettings};
