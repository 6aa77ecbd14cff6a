//! Periodic progress lines for every busy character.
use bevy::prelude::*;

use crate::{
    activity::{runner::ActivityRunner, types::ActivityTypes},
    character::components::Character,
    core::plugin::{TurnClock, TurnSettings},
};

/// Formats the progress line shown for one character, if it is doing anything.
pub fn progress_line(
    who: &Character,
    runner: &ActivityRunner,
    types: &ActivityTypes,
) -> Option<String> {
    let running = runner.current()?;
    let mut line = format!(
        "{} is {} ({:.0}% of moves spent",
        who.name,
        types.verb(running.id()),
        running.record.progress() * 100.0
    );
    let detail = running.progress_message();
    if !detail.is_empty() {
        line.push_str(": ");
        line.push_str(&detail);
    }
    line.push(')');

    let suspended = runner.backlog().count();
    if suspended > 0 {
        line.push_str(&format!(", {suspended} suspended"));
    }
    Some(line)
}

pub fn report_activity_progress(
    clock: Res<TurnClock>,
    settings: Res<TurnSettings>,
    types: Res<ActivityTypes>,
    actors: Query<(&Character, &ActivityRunner)>,
    mut last_reported: Local<u64>,
) {
    let interval = settings.progress_interval_turns;
    let turn = clock.turn();
    if interval == 0 || turn < *last_reported + interval {
        return;
    }
    *last_reported = turn;

    for (who, runner) in actors.iter() {
        if let Some(line) = progress_line(who, runner, &types) {
            info!("Turn {turn}: {line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::actor::test_support::CountingActor;

    #[test]
    fn idle_characters_have_no_progress_line() {
        let who = Character::new("Bryn", 100);
        let runner = ActivityRunner::default();
        assert!(progress_line(&who, &runner, &ActivityTypes::builtin()).is_none());
    }

    #[test]
    fn progress_line_mentions_actor_detail() {
        let types = ActivityTypes::builtin();
        let mut who = Character::new("Alric", 100);
        let mut runner = ActivityRunner::default();
        runner.assign_activity(Box::new(CountingActor::new(400)), &mut who, &types);
        who.gain_moves(100);
        runner.do_turn(&mut who, &types);

        let line = progress_line(&who, &runner, &types).expect("busy character");
        assert!(line.starts_with("Alric is "));
        assert!(line.contains("25% of moves spent"));
        assert!(line.contains("1 turns"));
    }
}
