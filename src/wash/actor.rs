//! Washing: a turn-stepped activity that spends water and cleanser item by item.
use serde::{Deserialize, Serialize};

use crate::{
    activity::{
        actor::{ActivityActor, SameType},
        record::PlayerActivity,
        types::{ActivityId, ACT_WASH},
    },
    character::components::{Character, ItemId, CLEANSER_KINDS, WATER_KINDS},
};

use super::{
    errors::WashError,
    requirements::{calc_total, get_available, round_down, round_up, WashRequirements},
};

/// An item stack to wash, how many of it, and the total requirement for those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WashTarget {
    pub loc: ItemId,
    pub count: u32,
    pub usage: WashRequirements,
}

impl WashTarget {
    pub fn new(loc: ItemId, count: u32, usage: WashRequirements) -> Self {
        Self { loc, count, usage }
    }

    /// Requirement for a single unit of this target.
    pub fn unit_usage(&self) -> WashRequirements {
        if self.count == 0 {
            return WashRequirements::ZERO;
        }
        let count = self.count as f32;
        WashRequirements::new(self.usage.water / count, self.usage.cleanser / count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitOutcome {
    Washed,
    /// The item is gone or already clean; its target was dropped.
    Missing,
    Shortage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WashActivityActor {
    targets: Vec<WashTarget>,
    total_moves: i32,
    /// Units already washed from `targets[0]`.
    front_washed: u32,
    washed: u32,
    // Average number of moves required to wash an item
    moves_per_item: f32,
    prev_moves_left: i32,
    moves_remainder: f32,
    // Whole charges are debited per item; the fractional rest rolls into the next one.
    carryover: WashRequirements,
    /// `round_up` of the whole run; debits never exceed it.
    reserved: WashRequirements,
    debited: WashRequirements,
}

impl WashActivityActor {
    pub fn new(targets: Vec<WashTarget>, total_moves_required: i32) -> Result<Self, WashError> {
        let targets: Vec<WashTarget> = targets
            .into_iter()
            .filter(|target| target.count > 0)
            .collect();
        let total_items: u32 = targets.iter().map(|target| target.count).sum();
        if total_items == 0 {
            return Err(WashError::NothingToWash);
        }

        let total_moves = total_moves_required.max(0);
        Ok(Self {
            total_moves,
            front_washed: 0,
            washed: 0,
            moves_per_item: total_moves as f32 / total_items as f32,
            prev_moves_left: 0,
            moves_remainder: 0.0,
            carryover: WashRequirements::ZERO,
            reserved: round_up(&calc_total(&targets)),
            debited: WashRequirements::ZERO,
            targets,
        })
    }

    pub fn deserialize(
        fields: serde_json::Value,
    ) -> Result<Box<dyn ActivityActor>, serde_json::Error> {
        let actor: Self = serde_json::from_value(fields)?;
        Ok(Box::new(actor))
    }

    pub fn items_washed(&self) -> u32 {
        self.washed
    }

    pub fn items_remaining(&self) -> u32 {
        self.remaining_counts().iter().map(|(_, count)| count).sum()
    }

    pub fn carryover(&self) -> WashRequirements {
        self.carryover
    }

    /// Whole charges taken from the inventory so far.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn debited(&self) -> WashRequirements {
        self.debited
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn reserved(&self) -> WashRequirements {
        self.reserved
    }

    pub fn moves_per_item(&self) -> f32 {
        self.moves_per_item
    }

    pub fn moves_remainder(&self) -> f32 {
        self.moves_remainder
    }

    /// Unwashed units per item, in wash order.
    fn remaining_counts(&self) -> Vec<(ItemId, u32)> {
        self.targets
            .iter()
            .enumerate()
            .map(|(index, target)| {
                let done = if index == 0 { self.front_washed } else { 0 };
                (target.loc, target.count.saturating_sub(done))
            })
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    fn next_unit_requirement(&self) -> Option<WashRequirements> {
        self.targets
            .first()
            .map(|target| target.unit_usage() + self.carryover)
    }

    fn can_afford_next(&self, who: &Character) -> bool {
        match self.next_unit_requirement() {
            Some(required) => round_up(&required).covered_by(&get_available(&who.inventory)),
            None => true,
        }
    }

    fn is_washable(who: &Character, loc: ItemId) -> bool {
        who.inventory
            .item(loc)
            .is_some_and(|item| item.filthy && item.count > 0)
    }

    /// Drops leading targets whose item is gone or already clean. Returns how many.
    fn discard_unavailable_front(&mut self, who: &Character) -> usize {
        let mut dropped = 0;
        while let Some(loc) = self.targets.first().map(|target| target.loc) {
            if Self::is_washable(who, loc) {
                break;
            }
            bevy::log::debug!("Dropping wash target {loc}: no longer filthy or present");
            self.targets.remove(0);
            self.front_washed = 0;
            dropped += 1;
        }
        dropped
    }

    /// Takes whole charges from the inventory and records them.
    fn debit(&mut self, who: &mut Character, amount: &WashRequirements) {
        let (water, cleanser) = amount.charges();
        let water = who.inventory.use_charges(&WATER_KINDS, water);
        let cleanser = who.inventory.use_charges(&CLEANSER_KINDS, cleanser);
        self.debited = self.debited + WashRequirements::new(water as f32, cleanser as f32);
    }

    fn advance_front(&mut self) {
        self.front_washed += 1;
        if self
            .targets
            .first()
            .is_some_and(|target| self.front_washed >= target.count)
        {
            self.targets.remove(0);
            self.front_washed = 0;
        }
    }

    fn wash_next_unit(&mut self, who: &mut Character) -> UnitOutcome {
        if self.discard_unavailable_front(who) > 0 {
            return UnitOutcome::Missing;
        }
        let Some(target) = self.targets.first() else {
            return UnitOutcome::Missing;
        };
        let loc = target.loc;

        let required = target.unit_usage() + self.carryover;
        if !round_up(&required).covered_by(&get_available(&who.inventory)) {
            return UnitOutcome::Shortage;
        }

        let debit = round_down(&required);
        self.debit(who, &debit);
        self.carryover = required.saturating_sub(&debit).without_dust();

        who.inventory.mark_clean(loc, 1);
        self.washed += 1;
        self.advance_front();
        UnitOutcome::Washed
    }

    fn stop_for_shortage(&self, act: &mut PlayerActivity, who: &mut Character) {
        who.add_msg(format!(
            "You don't have enough water or cleanser to keep washing. {} item(s) left unwashed.",
            self.items_remaining()
        ));
        act.set_to_null();
    }
}

impl ActivityActor for WashActivityActor {
    fn get_type(&self) -> ActivityId {
        ACT_WASH
    }

    fn start(&mut self, act: &mut PlayerActivity, _who: &mut Character) {
        act.set_moves(self.total_moves);
        self.prev_moves_left = act.moves_left;
    }

    fn do_turn(&mut self, act: &mut PlayerActivity, who: &mut Character) {
        let elapsed = (self.prev_moves_left - act.moves_left).max(0);
        self.prev_moves_left = act.moves_left;
        self.moves_remainder += elapsed as f32;

        self.discard_unavailable_front(who);
        if !self.can_afford_next(who) {
            self.stop_for_shortage(act, who);
            return;
        }

        while self.moves_remainder >= self.moves_per_item && !self.targets.is_empty() {
            match self.wash_next_unit(who) {
                UnitOutcome::Washed => self.moves_remainder -= self.moves_per_item,
                UnitOutcome::Missing => {}
                UnitOutcome::Shortage => {
                    self.stop_for_shortage(act, who);
                    return;
                }
            }
        }
    }

    fn finish(&mut self, act: &mut PlayerActivity, who: &mut Character) {
        // Float rounding can leave the last units short of moves.
        while !self.targets.is_empty() {
            if self.wash_next_unit(who) == UnitOutcome::Shortage {
                who.add_msg("You run out of water or cleanser before washing everything.");
                break;
            }
        }
        self.moves_remainder = 0.0;

        // Settle the fractional residue left by per-item rounding, never past the
        // reservation or what is left in the inventory.
        let settle = round_up(&self.carryover.without_dust())
            .min(&self.reserved.saturating_sub(&self.debited))
            .min(&get_available(&who.inventory));
        self.debit(who, &settle);
        self.carryover = WashRequirements::ZERO;

        who.add_msg(format!("You washed {} item(s).", self.washed));
        act.set_to_null();
    }

    fn canceled(&mut self, _act: &mut PlayerActivity, who: &mut Character) {
        // Washed units are already clean; the residue stays with this actor in case
        // the activity is resumed and is never charged otherwise.
        who.add_msg(format!(
            "You stop washing: {} item(s) washed, {} left.",
            self.washed,
            self.items_remaining()
        ));
    }

    fn can_resume_with_internal(
        &self,
        other: &dyn ActivityActor,
        _who: &Character,
        same: SameType,
    ) -> bool {
        let Some(other) = same.downcast::<Self>(other) else {
            return false;
        };

        let mut mine = self.remaining_counts();
        let mut theirs = other.remaining_counts();
        mine.sort_unstable();
        theirs.sort_unstable();
        !mine.is_empty() && mine == theirs
    }

    fn still_applies(&self, who: &Character) -> bool {
        self.remaining_counts().into_iter().all(|(loc, count)| {
            who.inventory
                .item(loc)
                .is_some_and(|item| item.filthy && item.count >= count)
        })
    }

    fn get_progress_message(&self, _act: &PlayerActivity) -> String {
        let remaining = self.items_remaining();
        let total = self.washed + remaining;
        let percent = if total == 0 {
            100
        } else {
            self.washed * 100 / total
        };
        format!("{remaining} item(s) left, {percent}% done")
    }

    fn clone_box(&self) -> Box<dyn ActivityActor> {
        Box::new(self.clone())
    }

    fn serialize(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
