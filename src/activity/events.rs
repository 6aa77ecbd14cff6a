//! Messages emitted when an activity leaves the running state.
use bevy::prelude::{Entity, Event, Message};

use super::types::ActivityId;

/// The activity used up its move budget and `finish` ran.
#[derive(Event, Message, Debug, Clone)]
pub struct ActivityFinishedEvent {
    pub entity: Entity,
    pub id: ActivityId,
    pub turn: u64,
}

/// The activity stopped itself before its budget ran out.
#[derive(Event, Message, Debug, Clone)]
pub struct ActivityStoppedEvent {
    pub entity: Entity,
    pub id: ActivityId,
    pub turn: u64,
}
