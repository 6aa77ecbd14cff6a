//! Character module: move budget, inventory and the demo laundry script.
pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::CharacterPlugin;
