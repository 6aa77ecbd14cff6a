//! Activity plugin wiring the type table, deserializer registry and turn systems.
use bevy::prelude::*;

use crate::core::plugin::update_turn_clock;

use super::{
    events::{ActivityFinishedEvent, ActivityStoppedEvent},
    registry::ActivityDeserializers,
    systems::{advance_activities, autosave_activities, load_saved_activities},
    types::ActivityTypes,
};

pub struct ActivityPlugin;

impl Plugin for ActivityPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActivityTypes>()
            .insert_resource(ActivityDeserializers::with_builtin())
            .add_event::<ActivityFinishedEvent>()
            .add_event::<ActivityStoppedEvent>()
            .add_systems(Startup, (log_activity_tables, load_saved_activities).chain())
            .add_systems(
                Update,
                (advance_activities, autosave_activities)
                    .chain()
                    .after(update_turn_clock),
            );
    }
}

fn log_activity_tables(types: Res<ActivityTypes>, registry: Res<ActivityDeserializers>) {
    info!(
        "ActivityPlugin initialised: {} activity types, {} deserializers",
        types.len(),
        registry.len()
    );
}
