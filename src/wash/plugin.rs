//! Wash plugin exposing per-volume washing costs.
use bevy::prelude::*;

use super::planning::WashSettings;

pub struct WashPlugin;

impl Plugin for WashPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(WashSettings::load_or_default())
            .add_systems(Startup, log_wash_costs);
    }
}

fn log_wash_costs(settings: Res<WashSettings>) {
    let shirt = settings.requirements_for_volume(250);
    info!(
        "WashPlugin initialised: 250ml takes {:.2} water, {:.2} cleanser, {:.0} moves",
        shirt.water,
        shirt.cleanser,
        settings.moves_for_volume(250)
    );
}
