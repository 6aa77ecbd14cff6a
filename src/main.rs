use std::time::Duration;

use bevy::{app::ScheduleRunnerPlugin, log::LogPlugin, prelude::*};

mod activity;
mod character;
mod core;
mod ui;
mod wash;

use crate::{
    activity::ActivityPlugin, character::CharacterPlugin, core::CorePlugin, ui::UiPlugin,
    wash::WashPlugin,
};

fn main() {
    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
            LogPlugin::default(),
            CorePlugin::default(),
            ActivityPlugin,
            WashPlugin,
            CharacterPlugin, // After ActivityPlugin so the save is loaded before it starts washing
            UiPlugin,
        ))
        .run();
}
