//! Character plugin spawning the demo character and driving its laundry day.
use bevy::prelude::*;

use crate::activity::systems::{advance_activities, load_saved_activities};

use super::systems::{
    exit_when_idle, run_demo_script, spawn_demo_character, start_demo_wash, DemoScript,
};

pub struct CharacterPlugin;

impl Plugin for CharacterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DemoScript>()
            .add_systems(
                Startup,
                (
                    spawn_demo_character.before(load_saved_activities),
                    start_demo_wash.after(load_saved_activities),
                ),
            )
            .add_systems(
                Update,
                (run_demo_script, exit_when_idle)
                    .chain()
                    .after(advance_activities),
            );
    }
}
