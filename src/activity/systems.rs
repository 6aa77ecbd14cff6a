//! Systems that advance activities once per turn and persist them.
use bevy::prelude::*;

use crate::{
    character::components::Character,
    core::plugin::{TurnClock, TurnSettings},
};

use super::{
    events::{ActivityFinishedEvent, ActivityStoppedEvent},
    registry::ActivityDeserializers,
    runner::{ActivityRunner, TurnOutcome},
    save::{read_save, write_save, SaveGame, SavedRunner},
    types::ActivityTypes,
};

/// Spends every pending turn: grants moves, then runs each character's activity.
pub fn advance_activities(
    mut clock: ResMut<TurnClock>,
    settings: Res<TurnSettings>,
    types: Res<ActivityTypes>,
    mut actors: Query<(Entity, &mut Character, &mut ActivityRunner)>,
    mut finished: MessageWriter<ActivityFinishedEvent>,
    mut stopped: MessageWriter<ActivityStoppedEvent>,
) {
    while let Some(turn) = clock.take_turn() {
        for (entity, mut who, mut runner) in actors.iter_mut() {
            who.gain_moves(settings.moves_per_turn);
            match runner.do_turn(&mut who, &types) {
                TurnOutcome::Finished(id) => {
                    info!("{} finished {} on turn {}", who.name, types.verb(&id), turn);
                    finished.write(ActivityFinishedEvent { entity, id, turn });
                }
                TurnOutcome::Stopped(id) => {
                    info!("{} stopped {} on turn {}", who.name, types.verb(&id), turn);
                    stopped.write(ActivityStoppedEvent { entity, id, turn });
                }
                TurnOutcome::Idle | TurnOutcome::InProgress => {}
            }
        }
    }
}

/// Collects every runner into a save document, skipping ones that fail to serialize.
pub fn build_save<'a>(
    turn: u64,
    runners: impl Iterator<Item = (&'a Character, &'a ActivityRunner)>,
) -> SaveGame {
    let mut save = SaveGame {
        turn,
        runners: Vec::new(),
    };
    for (who, runner) in runners {
        match SavedRunner::capture(&who.name, runner) {
            Ok(saved) => save.runners.push(saved),
            Err(err) => warn!("Skipping activities of {} in save: {err}", who.name),
        }
    }
    save
}

/// Writes the activity save every `autosave_interval_turns` turns.
pub fn autosave_activities(
    clock: Res<TurnClock>,
    settings: Res<TurnSettings>,
    actors: Query<(&Character, &ActivityRunner)>,
    mut last_saved: Local<u64>,
) {
    if settings.autosave_interval_turns == 0 {
        return;
    }
    let turn = clock.turn();
    if turn < *last_saved + settings.autosave_interval_turns {
        return;
    }
    *last_saved = turn;

    let save = build_save(turn, actors.iter());
    match write_save(&settings.save_path, &save) {
        Ok(()) => debug!("Autosaved activities at turn {turn}"),
        Err(err) => warn!("Autosave to {} failed: {err}", settings.save_path),
    }
}

/// Restores saved activities onto characters with matching names.
pub fn load_saved_activities(
    settings: Res<TurnSettings>,
    registry: Res<ActivityDeserializers>,
    mut actors: Query<(&Character, &mut ActivityRunner)>,
) {
    let report = match read_save(&settings.save_path, &registry) {
        Ok(Some(report)) => report,
        Ok(None) => {
            debug!("No saved activities at {}", settings.save_path);
            return;
        }
        Err(err) => {
            warn!(
                "Failed to load saved activities from {} ({}). Starting fresh.",
                settings.save_path, err
            );
            return;
        }
    };

    if !report.failures.is_empty() {
        warn!(
            "{} saved activit(ies) could not be restored and were dropped",
            report.failures.len()
        );
    }
    let restored = report.restored_activities();

    for entry in report.runners {
        match actors
            .iter_mut()
            .find(|(who, _)| who.name == entry.character)
        {
            Some((who, mut runner)) => {
                *runner = entry.runner;
                // Inventories are not saved, so progress is checked against the
                // items the character holds now.
                for id in runner.drop_inapplicable(who) {
                    warn!(
                        "Dropping restored {} of {}: its items no longer match the inventory",
                        id, who.name
                    );
                }
            }
            None => warn!(
                "Saved activities belong to unknown character {}",
                entry.character
            ),
        }
    }
    info!(
        "Restored {} activit(ies) saved at turn {} from {} (inventories are not part of the save)",
        restored, report.turn, settings.save_path
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::actor::test_support::CountingActor;

    #[test]
    fn build_save_captures_every_runner() {
        let types = ActivityTypes::builtin();
        let mut alric = Character::new("Alric", 100);
        let bryn = Character::new("Bryn", 100);

        let mut busy = ActivityRunner::default();
        busy.assign_activity(Box::new(CountingActor::new(100)), &mut alric, &types);
        let idle = ActivityRunner::default();

        let save = build_save(12, [(&alric, &busy), (&bryn, &idle)].into_iter());
        assert_eq!(save.turn, 12);
        assert_eq!(save.runners.len(), 2);
        assert!(save.runners[0].activity.is_some());
        assert!(save.runners[1].activity.is_none());
    }

    #[test]
    fn advance_system_finishes_activities() {
        let mut app = App::new();
        app.insert_resource(TurnSettings::default())
            .insert_resource(TurnClock::new(std::time::Duration::from_millis(1), 1.0))
            .insert_resource(ActivityTypes::builtin())
            .add_event::<ActivityFinishedEvent>()
            .add_event::<ActivityStoppedEvent>()
            .add_systems(Update, advance_activities);

        let types = ActivityTypes::builtin();
        let mut who = Character::new("Alric", 100);
        let mut runner = ActivityRunner::default();
        runner.assign_activity(Box::new(CountingActor::new(150)), &mut who, &types);
        let entity = app.world_mut().spawn((who, runner)).id();

        app.world_mut()
            .resource_mut::<TurnClock>()
            .tick(std::time::Duration::from_millis(2));
        app.update();

        let runner = app
            .world()
            .get::<ActivityRunner>(entity)
            .expect("runner component");
        assert!(!runner.is_active());
        assert_eq!(app.world().resource::<TurnClock>().turn(), 2);
    }
}
