//! UI plugin: log-based progress reports and activity telemetry.
use bevy::prelude::*;

use crate::activity::systems::advance_activities;

use super::{
    progress::report_activity_progress,
    telemetry::{log_activity_summary, record_activity_telemetry, ActivityTelemetry},
};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActivityTelemetry>()
            .add_systems(
                Update,
                (report_activity_progress, record_activity_telemetry)
                    .after(advance_activities),
            )
            .add_systems(Last, log_activity_summary);
    }
}
