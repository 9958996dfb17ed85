pub mod pause;

pub use pause::{AiPausePolicy, AiPauseService};
