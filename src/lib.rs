pub mod applier;
pub mod config;
pub mod telemetry;

pub use applier::{ApplyError, apply, apply_bundled, apply_with};
pub use config::ConnectionConfig;
