//! Type-keyed deserializer table used to rebuild actors from persisted state.
use std::collections::HashMap;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::wash::actor::WashActivityActor;

use super::{
    actor::ActivityActor,
    errors::ActivityError,
    types::{ActivityId, ACT_WASH},
};

/// Rebuilds a concrete actor from the fields it wrote in `serialize`.
pub type DeserializeFn = fn(serde_json::Value) -> Result<Box<dyn ActivityActor>, serde_json::Error>;

/// Persisted form of an actor: its type tag plus type-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedActor {
    #[serde(rename = "type")]
    pub kind: ActivityId,
    pub fields: serde_json::Value,
}

impl SavedActor {
    pub fn capture(actor: &dyn ActivityActor) -> Result<Self, ActivityError> {
        Ok(Self {
            kind: actor.get_type(),
            fields: actor.serialize()?,
        })
    }
}

/// Deserializers for every persistable actor type, built once at startup.
#[derive(Resource, Debug, Default)]
pub struct ActivityDeserializers {
    table: HashMap<ActivityId, DeserializeFn>,
}

impl ActivityDeserializers {
    /// Table holding every actor type shipped with the game.
    pub fn with_builtin() -> Self {
        let mut registry = Self::default();
        registry.register(ACT_WASH, WashActivityActor::deserialize);
        registry
    }

    /// Registers `deserialize` for `id`.
    ///
    /// # Panics
    /// When `id` already has a deserializer; two actor types sharing an id is a
    /// programming error.
    pub fn register(&mut self, id: ActivityId, deserialize: DeserializeFn) {
        if self.table.contains_key(&id) {
            panic!("activity deserializer for '{id}' registered twice");
        }
        self.table.insert(id, deserialize);
    }

    pub fn contains(&self, id: &ActivityId) -> bool {
        self.table.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Looks up the deserializer for `saved.kind` and rebuilds the actor.
    pub fn deserialize(&self, saved: &SavedActor) -> Result<Box<dyn ActivityActor>, ActivityError> {
        let deserialize = self
            .table
            .get(&saved.kind)
            .ok_or_else(|| ActivityError::unknown_type(saved.kind.clone()))?;

        let actor = deserialize(saved.fields.clone())
            .map_err(|err| ActivityError::malformed(saved.kind.clone(), err))?;

        let found = actor.get_type();
        if found != saved.kind {
            return Err(ActivityError::type_mismatch(saved.kind.clone(), found));
        }
        Ok(actor)
    }
}
