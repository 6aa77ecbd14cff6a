// src/ui/mod.rs
//
// Console "UI": everything here reports through the log.
//
// - Progress lines for busy characters every few turns
// - Telemetry of finished and stopped activities

pub mod plugin;
pub mod progress;
pub mod telemetry;

pub use plugin::UiPlugin;
