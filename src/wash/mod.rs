//! Washing: requirement math, planning and the wash activity actor.
pub mod actor;
pub mod errors;
pub mod planning;
pub mod plugin;
pub mod requirements;

pub use actor::{WashActivityActor, WashTarget};
pub use errors::WashError;
pub use planning::{plan_wash, select_all_filthy, WashPlan, WashSelection, WashSettings};
pub use plugin::WashPlugin;
pub use requirements::WashRequirements;
