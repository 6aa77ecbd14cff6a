//! Drives a character's current activity and keeps suspended ones for resuming.
use std::collections::VecDeque;

use bevy::prelude::*;

use crate::character::components::Character;

use super::{
    actor::ActivityActor,
    record::PlayerActivity,
    types::{ActivityId, ActivityTypes},
};

/// An activity record together with the actor that drives it.
#[derive(Debug, Clone)]
pub struct RunningActivity {
    pub record: PlayerActivity,
    pub actor: Box<dyn ActivityActor>,
}

impl RunningActivity {
    pub fn new(record: PlayerActivity, actor: Box<dyn ActivityActor>) -> Self {
        Self { record, actor }
    }

    pub fn id(&self) -> &ActivityId {
        &self.record.id
    }

    pub fn progress_message(&self) -> String {
        self.actor.get_progress_message(&self.record)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    Started,
    Resumed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Idle,
    InProgress,
    /// The move budget ran out and `finish` was called.
    Finished(ActivityId),
    /// The actor cleared the record itself.
    Stopped(ActivityId),
}

/// Owns the running activity of one character plus its backlog of suspended ones.
#[derive(Component, Debug, Clone, Default)]
pub struct ActivityRunner {
    current: Option<RunningActivity>,
    backlog: VecDeque<RunningActivity>,
}

impl ActivityRunner {
    pub fn restored(current: Option<RunningActivity>, backlog: Vec<RunningActivity>) -> Self {
        Self {
            current,
            backlog: backlog.into(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&RunningActivity> {
        self.current.as_ref()
    }

    pub fn backlog(&self) -> impl Iterator<Item = &RunningActivity> + '_ {
        self.backlog.iter()
    }

    pub fn progress_message(&self) -> Option<String> {
        self.current.as_ref().map(RunningActivity::progress_message)
    }

    /// Whether assigning `actor` would resume a suspended activity rather than start it.
    pub fn would_resume(&self, actor: &dyn ActivityActor, who: &Character) -> bool {
        self.current
            .iter()
            .chain(self.backlog.iter())
            .any(|suspended| suspended.actor.can_resume_with(actor, who))
    }

    /// Makes `actor` the current activity. The running activity, if any, is cancelled
    /// first; a suspended equivalent activity is resumed instead of starting over.
    pub fn assign_activity(
        &mut self,
        actor: Box<dyn ActivityActor>,
        who: &mut Character,
        types: &ActivityTypes,
    ) -> AssignOutcome {
        self.cancel_activity(who, types);

        let resumable = self
            .backlog
            .iter()
            .position(|suspended| suspended.actor.can_resume_with(actor.as_ref(), who));
        if let Some(resumed) = resumable.and_then(|index| self.backlog.remove(index)) {
            who.add_msg(format!("You resume {}.", types.verb(resumed.id())));
            self.current = Some(resumed);
            return AssignOutcome::Resumed;
        }

        let mut actor = actor;
        let mut record = PlayerActivity::new(actor.get_type());
        actor.start(&mut record, who);
        debug!(
            "{} starts {} ({} moves)",
            who.name, record.id, record.moves_total
        );
        self.current = Some(RunningActivity::new(record, actor));
        AssignOutcome::Started
    }

    /// Spends the character's moves on the current activity for one turn.
    pub fn do_turn(&mut self, who: &mut Character, types: &ActivityTypes) -> TurnOutcome {
        let Some(running) = self.current.as_mut() else {
            who.set_activity_level(0.0);
            return TurnOutcome::Idle;
        };
        let RunningActivity { record, actor } = running;

        who.set_activity_level(actor.exertion_level(types));
        if !record.is_null() {
            let spent = record.spend_moves(who.moves);
            who.moves -= spent;
            actor.do_turn(record, who);
        }

        if record.is_null() {
            // Stopped by the actor: clean up, nothing to suspend.
            actor.canceled(record, who);
            let id = record.id.clone();
            debug!("{} stopped {} early", who.name, id);
            self.current = None;
            return TurnOutcome::Stopped(id);
        }

        if record.is_exhausted() {
            actor.finish(record, who);
            let id = record.id.clone();
            debug!("{} finished {}", who.name, id);
            self.current = None;
            return TurnOutcome::Finished(id);
        }

        TurnOutcome::InProgress
    }

    /// Cancels the current activity between turns. Suspendable activities are kept at
    /// the front of the backlog so an equivalent request can resume them.
    pub fn cancel_activity(
        &mut self,
        who: &mut Character,
        types: &ActivityTypes,
    ) -> Option<ActivityId> {
        let mut running = self.current.take()?;
        running.actor.canceled(&mut running.record, who);
        let id = running.record.id.clone();

        if types.is_suspendable(&id) && !running.record.is_null() {
            debug!("{} suspends {}", who.name, id);
            self.backlog.push_front(running);
        }
        Some(id)
    }

    /// Drops activities, running or suspended, that no longer apply to `who`.
    /// Returns the ids that were dropped.
    pub fn drop_inapplicable(&mut self, who: &Character) -> Vec<ActivityId> {
        let mut dropped = Vec::new();
        if self
            .current
            .as_ref()
            .is_some_and(|running| !running.actor.still_applies(who))
        {
            dropped.extend(self.current.take().map(|running| running.record.id));
        }
        self.backlog.retain(|suspended| {
            let applies = suspended.actor.still_applies(who);
            if !applies {
                dropped.push(suspended.record.id.clone());
            }
            applies
        });
        dropped
    }

    /// Drops every suspended activity.
    pub fn clear_backlog(&mut self) {
        self.backlog.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::actor::test_support::{CountingActor, ACT_COUNT};
    use crate::activity::types::ACT_WASH;
    use crate::character::components::ChargeKind;
    use crate::wash::{plan_wash, select_all_filthy, WashSettings};

    fn counting_types() -> ActivityTypes {
        ActivityTypes::from_toml(
            r#"
            [[activities]]
            id = "ACT_COUNT"
            verb = "counting"
            exertion_level = 4.0
            suspendable = true

            [[activities]]
            id = "ACT_WASH"
            verb = "washing"
            suspendable = true
            "#,
        )
        .expect("inline config should parse")
    }

    fn run_turn(
        runner: &mut ActivityRunner,
        who: &mut Character,
        types: &ActivityTypes,
    ) -> TurnOutcome {
        who.gain_moves(100);
        runner.do_turn(who, types)
    }

    #[test]
    fn idle_runner_reports_idle() {
        let mut runner = ActivityRunner::default();
        let mut who = Character::new("Cedric", 100);
        assert_eq!(
            run_turn(&mut runner, &mut who, &counting_types()),
            TurnOutcome::Idle
        );
        assert!(runner.progress_message().is_none());
    }

    #[test]
    fn finishes_when_moves_run_out() {
        let types = counting_types();
        let mut runner = ActivityRunner::default();
        let mut who = Character::new("Cedric", 100);

        let outcome = runner.assign_activity(Box::new(CountingActor::new(250)), &mut who, &types);
        assert_eq!(outcome, AssignOutcome::Started);
        assert_eq!(runner.current().map(|r| r.record.moves_total), Some(250));

        assert_eq!(run_turn(&mut runner, &mut who, &types), TurnOutcome::InProgress);
        assert!((who.activity_level() - 4.0).abs() < f32::EPSILON);
        assert_eq!(who.moves, 0);
        assert_eq!(run_turn(&mut runner, &mut who, &types), TurnOutcome::InProgress);
        assert_eq!(runner.progress_message().as_deref(), Some("2 turns"));

        // Only 50 moves remain, the rest stays with the character.
        assert_eq!(
            run_turn(&mut runner, &mut who, &types),
            TurnOutcome::Finished(ACT_COUNT)
        );
        assert_eq!(who.moves, 50);
        assert!(!runner.is_active());
    }

    #[test]
    fn early_stop_skips_finish() {
        let types = counting_types();
        let mut runner = ActivityRunner::default();
        let mut who = Character::new("Cedric", 100);
        let mut actor = CountingActor::new(1000);
        actor.stop_after = Some(2);
        runner.assign_activity(Box::new(actor), &mut who, &types);

        assert_eq!(run_turn(&mut runner, &mut who, &types), TurnOutcome::InProgress);
        assert_eq!(
            run_turn(&mut runner, &mut who, &types),
            TurnOutcome::Stopped(ACT_COUNT)
        );
        assert!(!runner.is_active());
        assert_eq!(runner.backlog().count(), 0);
    }

    #[test]
    fn cancelled_activity_resumes_with_progress() {
        let types = counting_types();
        let mut runner = ActivityRunner::default();
        let mut who = Character::new("Cedric", 100);

        runner.assign_activity(Box::new(CountingActor::new(500)), &mut who, &types);
        run_turn(&mut runner, &mut who, &types);
        run_turn(&mut runner, &mut who, &types);

        assert_eq!(runner.cancel_activity(&mut who, &types), Some(ACT_COUNT));
        assert!(!runner.is_active());
        assert_eq!(runner.backlog().count(), 1);

        let request = CountingActor::new(500);
        assert!(runner.would_resume(&request, &who));
        let outcome = runner.assign_activity(Box::new(request), &mut who, &types);
        assert_eq!(outcome, AssignOutcome::Resumed);
        assert_eq!(runner.backlog().count(), 0);

        let current = runner.current().expect("resumed activity");
        assert_eq!(current.record.moves_left, 300);
        assert_eq!(current.progress_message(), "2 turns");
        assert!(who.messages().iter().any(|msg| msg == "You resume counting."));
    }

    #[test]
    fn non_suspendable_cancellation_is_dropped() {
        let types = ActivityTypes::from_toml(
            r#"
            [[activities]]
            id = "ACT_COUNT"
            verb = "counting"
            "#,
        )
        .expect("inline config should parse");
        let mut runner = ActivityRunner::default();
        let mut who = Character::new("Cedric", 100);

        runner.assign_activity(Box::new(CountingActor::new(500)), &mut who, &types);
        runner.cancel_activity(&mut who, &types);
        assert_eq!(runner.backlog().count(), 0);
        assert_eq!(
            runner.assign_activity(Box::new(CountingActor::new(500)), &mut who, &types),
            AssignOutcome::Started
        );
    }

    #[test]
    fn clone_leaves_live_runner_untouched() {
        let types = counting_types();
        let mut runner = ActivityRunner::default();
        let mut who = Character::new("Cedric", 100);
        runner.assign_activity(Box::new(CountingActor::new(500)), &mut who, &types);
        run_turn(&mut runner, &mut who, &types);

        let mut probe = runner.clone();
        let mut probe_who = who.clone();
        run_turn(&mut probe, &mut probe_who, &types);

        assert_eq!(runner.progress_message().as_deref(), Some("1 turns"));
        assert_eq!(probe.progress_message().as_deref(), Some("2 turns"));
    }

    #[test]
    fn washing_without_cleanser_stops_and_keeps_items_dirty() {
        let types = counting_types();
        let mut who = Character::new("Alric", 100);
        let shirts = who.inventory.add_item("shirt", 250, 10, true);
        who.inventory.add_charges(ChargeKind::Water, 10);
        who.inventory.add_charges(ChargeKind::Soap, 2);

        let plan = plan_wash(
            &who.inventory,
            &select_all_filthy(&who.inventory),
            &WashSettings::default(),
        )
        .expect("enough supplies");
        // Soap disappears after planning.
        who.inventory.use_charges(&[ChargeKind::Soap], 2);

        let mut runner = ActivityRunner::default();
        let actor = plan.into_actor().expect("non-empty plan");
        runner.assign_activity(Box::new(actor), &mut who, &types);

        assert_eq!(
            run_turn(&mut runner, &mut who, &types),
            TurnOutcome::Stopped(ACT_WASH)
        );
        assert_eq!(who.inventory.item(shirts).map(|item| item.count), Some(10));
        assert_eq!(who.inventory.filthy_count(), 10);
        assert!(who
            .messages()
            .iter()
            .any(|msg| msg.starts_with("You stop washing: 0 item(s) washed")));
    }

    #[test]
    fn restored_wash_is_dropped_when_items_no_longer_match() {
        let types = counting_types();
        let mut who = Character::new("Alric", 100);
        who.inventory.add_item("shirt", 250, 4, true);
        who.inventory.add_charges(ChargeKind::Water, 10);
        who.inventory.add_charges(ChargeKind::Soap, 2);
        let plan = plan_wash(
            &who.inventory,
            &select_all_filthy(&who.inventory),
            &WashSettings::default(),
        )
        .expect("enough supplies");
        let mut runner = ActivityRunner::default();
        runner.assign_activity(
            Box::new(plan.into_actor().expect("non-empty plan")),
            &mut who,
            &types,
        );
        runner.assign_activity(Box::new(CountingActor::new(300)), &mut who, &types);
        assert_eq!(runner.backlog().count(), 1);

        assert!(runner.drop_inapplicable(&who).is_empty());

        let respawned = Character::new("Alric", 100);
        assert_eq!(runner.drop_inapplicable(&respawned), vec![ACT_WASH]);
        assert!(runner.is_active());
        assert_eq!(runner.backlog().count(), 0);
    }

    #[test]
    fn washing_resumes_after_interruption() {
        let types = counting_types();
        let mut who = Character::new("Alric", 100);
        who.inventory.add_item("shirt", 250, 10, true);
        who.inventory.add_charges(ChargeKind::Water, 10);
        who.inventory.add_charges(ChargeKind::Soap, 2);
        let settings = WashSettings::default();

        let plan = plan_wash(&who.inventory, &select_all_filthy(&who.inventory), &settings)
            .expect("enough supplies");
        let mut runner = ActivityRunner::default();
        runner.assign_activity(
            Box::new(plan.into_actor().expect("non-empty plan")),
            &mut who,
            &types,
        );
        run_turn(&mut runner, &mut who, &types);
        runner.cancel_activity(&mut who, &types);
        assert_eq!(who.inventory.filthy_count(), 8);

        // Asking again for the remaining shirts continues the suspended run.
        let plan = plan_wash(&who.inventory, &select_all_filthy(&who.inventory), &settings)
            .expect("enough supplies");
        let outcome = runner.assign_activity(
            Box::new(plan.into_actor().expect("non-empty plan")),
            &mut who,
            &types,
        );
        assert_eq!(outcome, AssignOutcome::Resumed);

        let mut finished = false;
        for _ in 0..10 {
            if run_turn(&mut runner, &mut who, &types) == TurnOutcome::Finished(ACT_WASH) {
                finished = true;
                break;
            }
        }
        assert!(finished);
        assert_eq!(who.inventory.filthy_count(), 0);
        assert_eq!(who.inventory.charges_among(&[ChargeKind::Water]), 0);
    }
}
