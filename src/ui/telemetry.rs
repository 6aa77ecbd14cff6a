//! Rolling record of activities that left the running state.
use std::collections::VecDeque;

use bevy::prelude::*;

use crate::activity::{
    events::{ActivityFinishedEvent, ActivityStoppedEvent},
    types::ActivityId,
};

const DEFAULT_ACTIVITY_TELEMETRY_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityEnding {
    Finished,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct ActivityTelemetryRecord {
    pub entity: Entity,
    pub id: ActivityId,
    pub turn: u64,
    pub ending: ActivityEnding,
}

#[derive(Resource, Debug)]
pub struct ActivityTelemetry {
    capacity: usize,
    records: VecDeque<ActivityTelemetryRecord>,
    finished: u64,
    stopped: u64,
}

impl ActivityTelemetry {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: VecDeque::new(),
            finished: 0,
            stopped: 0,
        }
    }

    pub fn push(&mut self, record: ActivityTelemetryRecord) {
        match record.ending {
            ActivityEnding::Finished => self.finished += 1,
            ActivityEnding::Stopped => self.stopped += 1,
        }
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn records(&self) -> impl Iterator<Item = &ActivityTelemetryRecord> {
        self.records.iter()
    }

    pub fn finished(&self) -> u64 {
        self.finished
    }

    pub fn stopped(&self) -> u64 {
        self.stopped
    }
}

impl Default for ActivityTelemetry {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVITY_TELEMETRY_CAPACITY)
    }
}

pub fn record_activity_telemetry(
    mut telemetry: ResMut<ActivityTelemetry>,
    mut finished: MessageReader<ActivityFinishedEvent>,
    mut stopped: MessageReader<ActivityStoppedEvent>,
) {
    for event in finished.read() {
        telemetry.push(ActivityTelemetryRecord {
            entity: event.entity,
            id: event.id.clone(),
            turn: event.turn,
            ending: ActivityEnding::Finished,
        });
    }
    for event in stopped.read() {
        telemetry.push(ActivityTelemetryRecord {
            entity: event.entity,
            id: event.id.clone(),
            turn: event.turn,
            ending: ActivityEnding::Stopped,
        });
    }
}

/// Prints the totals when the app shuts down.
pub fn log_activity_summary(telemetry: Res<ActivityTelemetry>, mut exits: MessageReader<AppExit>) {
    if exits.read().next().is_none() {
        return;
    }
    info!(
        "Activities finished: {}, stopped early: {}",
        telemetry.finished(),
        telemetry.stopped()
    );
    for record in telemetry.records() {
        debug!(
            "turn {}: {} {:?} ({:?})",
            record.turn, record.id, record.ending, record.entity
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::types::ACT_WASH;

    fn record(turn: u64, ending: ActivityEnding) -> ActivityTelemetryRecord {
        ActivityTelemetryRecord {
            entity: Entity::PLACEHOLDER,
            id: ACT_WASH,
            turn,
            ending,
        }
    }

    #[test]
    fn keeps_totals_beyond_capacity() {
        let mut telemetry = ActivityTelemetry::new(2);
        telemetry.push(record(1, ActivityEnding::Finished));
        telemetry.push(record(2, ActivityEnding::Stopped));
        telemetry.push(record(3, ActivityEnding::Finished));

        assert_eq!(telemetry.finished(), 2);
        assert_eq!(telemetry.stopped(), 1);
        let turns: Vec<u64> = telemetry.records().map(|record| record.turn).collect();
        assert_eq!(turns, vec![2, 3]);
    }

    #[test]
    fn system_collects_events() {
        let mut app = App::new();
        app.init_resource::<ActivityTelemetry>()
            .add_event::<ActivityFinishedEvent>()
            .add_event::<ActivityStoppedEvent>()
            .add_systems(Update, record_activity_telemetry);

        app.world_mut().write_message(ActivityStoppedEvent {
            entity: Entity::PLACEHOLDER,
            id: ACT_WASH,
            turn: 4,
        });
        app.update();

        let telemetry = app.world().resource::<ActivityTelemetry>();
        assert_eq!(telemetry.stopped(), 1);
        assert_eq!(telemetry.finished(), 0);
    }
}
