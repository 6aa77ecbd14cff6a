//! Resumable, interruptible activities: the actor trait, the per-character runner,
//! and save/load through a registry of deserializers keyed by activity type.

pub mod actor;
pub mod errors;
pub mod events;
pub mod plugin;
pub mod record;
pub mod registry;
pub mod runner;
pub mod save;
pub mod systems;
pub mod types;

pub use plugin::ActivityPlugin;
