//! Core module hosting the turn clock shared by every simulation plugin.
pub mod plugin;

pub use plugin::CorePlugin;
