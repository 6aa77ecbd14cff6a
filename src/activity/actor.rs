//! The contract every resumable, multi-turn activity implements.
use std::{any::Any, fmt};

use crate::character::components::Character;

use super::{
    record::PlayerActivity,
    types::{ActivityId, ActivityTypes},
};

/// Proof that the type check in [`ActivityActor::can_resume_with`] passed.
///
/// Only this module can construct it, so `can_resume_with_internal` is unreachable
/// except through the guarded public method.
#[derive(Debug, Clone, Copy)]
pub struct SameType {
    _private: (),
}

impl SameType {
    /// Downcasts `other` to the concrete actor type. Succeeds for every actor type
    /// whose `get_type` is unique, which the deserializer registry enforces.
    pub fn downcast<T: ActivityActor>(self, other: &dyn ActivityActor) -> Option<&T> {
        let other: &dyn Any = other;
        other.downcast_ref::<T>()
    }
}

/// A multi-turn action performed by a character.
///
/// Lifecycle: `start` once, `do_turn` every turn while the activity is alive, then
/// either `finish` (move budget exhausted), `canceled` (interrupted from outside) or
/// nothing at all when the actor cleared the record itself.
pub trait ActivityActor: Any + Send + Sync + fmt::Debug {
    /// Activity id of the corresponding activity.
    fn get_type(&self) -> ActivityId;

    /// Called once at the start of the activity. May set the record's move budget.
    fn start(&mut self, act: &mut PlayerActivity, who: &mut Character);

    /// Called on every turn. May stop the activity prematurely via `act.set_to_null()`.
    fn do_turn(&mut self, act: &mut PlayerActivity, who: &mut Character);

    /// Called when the activity runs out of moves, unless the record was already cleared.
    fn finish(&mut self, act: &mut PlayerActivity, who: &mut Character);

    /// Called just before a cancellation takes effect.
    fn canceled(&mut self, _act: &mut PlayerActivity, _who: &mut Character) {}

    /// Whether this (suspended) activity can be resumed instead of starting `other`.
    fn can_resume_with(&self, other: &dyn ActivityActor, who: &Character) -> bool {
        if other.get_type() == self.get_type() {
            return self.can_resume_with_internal(other, who, SameType { _private: () });
        }

        false
    }

    /// Type-specific equivalence check; `other` is known to share this actor's type.
    /// Most activities are not resumable.
    fn can_resume_with_internal(
        &self,
        _other: &dyn ActivityActor,
        _who: &Character,
        _same: SameType,
    ) -> bool {
        false
    }

    /// Progress text shown while the activity runs.
    fn get_progress_message(&self, _act: &PlayerActivity) -> String {
        String::new()
    }

    /// Whether the activity still makes sense for `who`, e.g. after a load rebuilt
    /// the world around it.
    fn still_applies(&self, _who: &Character) -> bool {
        true
    }

    /// How strenuous the activity is, looked up from the type definition by default.
    fn exertion_level(&self, types: &ActivityTypes) -> f32 {
        types.exertion_level(&self.get_type())
    }

    /// Deep copy that behaves like the original and reports the same type.
    fn clone_box(&self) -> Box<dyn ActivityActor>;

    /// Writes the actor's own fields. The matching deserializer must be registered in
    /// [`super::registry::ActivityDeserializers`].
    fn serialize(&self) -> Result<serde_json::Value, serde_json::Error>;
}

impl Clone for Box<dyn ActivityActor> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
