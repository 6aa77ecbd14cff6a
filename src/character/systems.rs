//! Demo character: spawning, the laundry request and a scripted interruption.
use bevy::prelude::*;

use crate::{
    activity::{
        runner::{ActivityRunner, AssignOutcome},
        save::write_save,
        systems::build_save,
        types::ActivityTypes,
    },
    core::plugin::{TurnClock, TurnSettings},
    wash::{plan_wash, select_all_filthy, WashError, WashSettings},
};

use super::components::{Character, ChargeKind};

/// Where the scripted demo currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoStage {
    Washing,
    Interrupted { since_turn: u64 },
    Done,
}

/// Interrupts the demo wash once and asks for it again a few turns later.
#[derive(Resource, Debug, Clone)]
pub struct DemoScript {
    pub interrupt_at_turn: u64,
    pub pause_turns: u64,
    pub stage: DemoStage,
}

impl Default for DemoScript {
    fn default() -> Self {
        Self {
            interrupt_at_turn: 3,
            pause_turns: 2,
            stage: DemoStage::Washing,
        }
    }
}

/// Spawns a character with a pile of dirty laundry and washing supplies.
pub fn spawn_demo_character(mut commands: Commands) {
    let mut who = Character::new("Alric", 100);
    who.inventory.add_item("linen shirt", 250, 10, true);
    who.inventory.add_item("wool trousers", 500, 2, true);
    who.inventory.add_item("straw hat", 300, 1, false);
    who.inventory.add_charges(ChargeKind::Water, 20);
    who.inventory.add_charges(ChargeKind::Soap, 3);

    info!(
        "Spawned {} with {} filthy item(s)",
        who.name,
        who.inventory.filthy_count()
    );
    commands.spawn((who, ActivityRunner::default(), Name::new("Alric")));
}

/// Plans a wash of everything filthy and hands it to the runner.
pub fn request_wash(
    who: &mut Character,
    runner: &mut ActivityRunner,
    settings: &WashSettings,
    types: &ActivityTypes,
) -> Result<AssignOutcome, WashError> {
    let selection = select_all_filthy(&who.inventory);
    let plan = plan_wash(&who.inventory, &selection, settings)?;
    debug!(
        "{} plans to wash {} stack(s) using {:.0} water and {:.0} cleanser",
        who.name,
        plan.targets.len(),
        plan.reserved.water,
        plan.reserved.cleanser
    );
    let actor = plan.into_actor()?;
    if runner.would_resume(&actor, who) {
        debug!("{} picks the suspended wash back up", who.name);
    }
    Ok(runner.assign_activity(Box::new(actor), who, types))
}

/// Starts washing for idle characters that did not get an activity back from a save.
pub fn start_demo_wash(
    settings: Res<WashSettings>,
    types: Res<ActivityTypes>,
    mut actors: Query<(&mut Character, &mut ActivityRunner)>,
) {
    for (mut who, mut runner) in actors.iter_mut() {
        if runner.is_active() || runner.backlog().next().is_some() {
            continue;
        }
        match request_wash(&mut who, &mut runner, &settings, &types) {
            Ok(outcome) => debug!("{} wash request: {:?}", who.name, outcome),
            Err(err) => warn!("{} cannot start washing: {err}", who.name),
        }
    }
}

/// Cancels the running wash once, then asks for the same wash again to resume it.
pub fn run_demo_script(
    clock: Res<TurnClock>,
    settings: Res<WashSettings>,
    types: Res<ActivityTypes>,
    mut script: ResMut<DemoScript>,
    mut actors: Query<(&mut Character, &mut ActivityRunner)>,
) {
    let turn = clock.turn();
    match script.stage {
        DemoStage::Washing if turn >= script.interrupt_at_turn => {
            for (mut who, mut runner) in actors.iter_mut() {
                who.add_msg("Someone knocks at the door.");
                runner.cancel_activity(&mut who, &types);
            }
            script.stage = DemoStage::Interrupted { since_turn: turn };
        }
        DemoStage::Interrupted { since_turn } if turn >= since_turn + script.pause_turns => {
            for (mut who, mut runner) in actors.iter_mut() {
                match request_wash(&mut who, &mut runner, &settings, &types) {
                    Ok(AssignOutcome::Resumed) => {}
                    Ok(AssignOutcome::Started) => {
                        warn!("{} started the wash over instead of resuming", who.name);
                        // The old progress can no longer be picked up.
                        runner.clear_backlog();
                    }
                    Err(err) => warn!("{} cannot go back to washing: {err}", who.name),
                }
            }
            script.stage = DemoStage::Done;
        }
        _ => {}
    }
}

/// Writes a final save and exits once nobody has anything left to do.
pub fn exit_when_idle(
    clock: Res<TurnClock>,
    settings: Res<TurnSettings>,
    script: Res<DemoScript>,
    actors: Query<(&Character, &ActivityRunner)>,
    mut exit: MessageWriter<AppExit>,
) {
    let busy = actors
        .iter()
        .any(|(_, runner)| runner.is_active() || runner.backlog().next().is_some());
    if busy || matches!(script.stage, DemoStage::Interrupted { .. }) {
        return;
    }

    for (who, _) in actors.iter() {
        info!(
            "{} is done after {} turn(s); {} filthy item(s) left",
            who.name,
            clock.turn(),
            who.inventory.filthy_count()
        );
    }
    let save = build_save(clock.turn(), actors.iter());
    if let Err(err) = write_save(&settings.save_path, &save) {
        warn!("Final save to {} failed: {err}", settings.save_path);
    }
    exit.write(AppExit::Success);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::components::CLEANSER_KINDS;

    fn laundry_owner() -> Character {
        let mut who = Character::new("Alric", 100);
        who.inventory.add_item("linen shirt", 250, 10, true);
        who.inventory.add_item("wool trousers", 500, 2, true);
        who.inventory.add_charges(ChargeKind::Water, 20);
        who.inventory.add_charges(ChargeKind::Soap, 3);
        who
    }

    #[test]
    fn request_starts_then_resumes_after_interruption() {
        let types = ActivityTypes::builtin();
        let settings = WashSettings::default();
        let mut who = laundry_owner();
        let mut runner = ActivityRunner::default();

        let outcome = request_wash(&mut who, &mut runner, &settings, &types).expect("supplies");
        assert_eq!(outcome, AssignOutcome::Started);

        who.gain_moves(100);
        runner.do_turn(&mut who, &types);
        runner.cancel_activity(&mut who, &types);
        assert!(!runner.is_active());
        assert_eq!(runner.backlog().count(), 1);

        let outcome = request_wash(&mut who, &mut runner, &settings, &types).expect("supplies");
        assert_eq!(outcome, AssignOutcome::Resumed);
        assert_eq!(runner.backlog().count(), 0);
    }

    #[test]
    fn request_without_soap_is_refused() {
        let types = ActivityTypes::builtin();
        let mut who = laundry_owner();
        who.inventory.use_charges(&CLEANSER_KINDS, 3);
        let mut runner = ActivityRunner::default();

        let err = request_wash(&mut who, &mut runner, &WashSettings::default(), &types)
            .unwrap_err();
        assert!(matches!(err, WashError::InsufficientCleanser { .. }));
        assert!(!runner.is_active());
    }
}
