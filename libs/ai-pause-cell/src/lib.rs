pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;

pub use router::ai_pause_routes;
pub use services::pause::{AiPausePolicy, AiPauseService};
