//! The activity record: the turn budget shared between the runner and an actor.
use serde::{Deserialize, Serialize};

use super::types::ActivityId;

/// Turn budget and liveness of one activity.
///
/// Actors read and adjust `moves_left`/`moves_total` and may stop the activity
/// early with [`PlayerActivity::set_to_null`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerActivity {
    pub id: ActivityId,
    pub moves_total: i32,
    pub moves_left: i32,
    #[serde(skip)]
    null: bool,
}

impl PlayerActivity {
    pub fn new(id: ActivityId) -> Self {
        Self {
            id,
            moves_total: 0,
            moves_left: 0,
            null: false,
        }
    }

    /// Stops the activity; the runner will not call `finish` for it.
    pub fn set_to_null(&mut self) {
        self.null = true;
    }

    pub fn is_null(&self) -> bool {
        self.null
    }

    pub fn set_moves(&mut self, moves: i32) {
        self.moves_total = moves.max(0);
        self.moves_left = self.moves_total;
    }

    /// Spends up to `available` moves from the budget. Returns the moves used.
    pub fn spend_moves(&mut self, available: i32) -> i32 {
        let spent = available.clamp(0, self.moves_left.max(0));
        self.moves_left -= spent;
        spent
    }

    pub fn is_exhausted(&self) -> bool {
        self.moves_left <= 0
    }

    /// Fraction of the budget already spent, in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        if self.moves_total <= 0 {
            return 0.0;
        }
        let spent = (self.moves_total - self.moves_left.max(0)) as f32;
        (spent / self.moves_total as f32).clamp(0.0, 1.0)
    }
}
