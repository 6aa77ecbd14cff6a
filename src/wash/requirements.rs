//! Fractional water/cleanser requirements and the helpers that aggregate them.
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::character::components::{Inventory, CLEANSER_KINDS, WATER_KINDS};

use super::actor::WashTarget;

/// Water and cleanser needed for washing, in charges.
///
/// Usage per item is fractional while inventory charges are whole, so amounts are
/// kept as floats and quantized with [`round_up`] / [`round_down`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WashRequirements {
    pub water: f32,
    pub cleanser: f32,
}

impl WashRequirements {
    /// Sentinel meaning "no limit".
    pub const MAX: f32 = f32::MAX;

    pub const ZERO: Self = Self {
        water: 0.0,
        cleanser: 0.0,
    };

    pub fn new(water: f32, cleanser: f32) -> Self {
        Self { water, cleanser }
    }

    pub fn unbounded() -> Self {
        Self::new(Self::MAX, Self::MAX)
    }

    /// True when every component of `self` is covered by `available`.
    pub fn covered_by(&self, available: &Self) -> bool {
        self.water <= available.water && self.cleanser <= available.cleanser
    }

    /// Component-wise difference, never below zero.
    pub fn saturating_sub(&self, other: &Self) -> Self {
        Self::new(
            (self.water - other.water).max(0.0),
            (self.cleanser - other.cleanser).max(0.0),
        )
    }

    /// Component-wise minimum.
    pub fn min(&self, other: &Self) -> Self {
        Self::new(self.water.min(other.water), self.cleanser.min(other.cleanser))
    }

    /// Zeroes components too small to ever add up to a charge.
    pub fn without_dust(&self) -> Self {
        let clean = |amount: f32| if amount < ROUNDING_TOLERANCE { 0.0 } else { amount };
        Self::new(clean(self.water), clean(self.cleanser))
    }

    pub fn scale(&self, factor: f32) -> Self {
        Self::new(self.water * factor, self.cleanser * factor)
    }

    /// Whole charges as integers; fractions are truncated.
    pub fn charges(&self) -> (u32, u32) {
        (charge_count(self.water), charge_count(self.cleanser))
    }
}

impl Add for WashRequirements {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.water + rhs.water, self.cleanser + rhs.cleanser)
    }
}

fn charge_count(amount: f32) -> u32 {
    if amount >= u32::MAX as f32 {
        u32::MAX
    } else {
        amount.max(0.0) as u32
    }
}

/// Slack absorbed by rounding; per-unit fractions drift by a few ulps in `f32`.
pub const ROUNDING_TOLERANCE: f32 = 1e-4;

fn quantize(amount: f32, op: fn(f32) -> f32) -> f32 {
    if amount >= WashRequirements::MAX {
        return WashRequirements::MAX;
    }
    op(amount)
}

/// Rounds every component up; used when reserving so nothing is under-allocated.
/// Amounts within [`ROUNDING_TOLERANCE`] above a whole charge count as that charge.
pub fn round_up(reqs: &WashRequirements) -> WashRequirements {
    let up = |amount: f32| (amount - ROUNDING_TOLERANCE).ceil().max(0.0);
    WashRequirements::new(quantize(reqs.water, up), quantize(reqs.cleanser, up))
}

/// Rounds every component down; used for the charges actually debited.
/// Amounts within [`ROUNDING_TOLERANCE`] below a whole charge count as that charge.
pub fn round_down(reqs: &WashRequirements) -> WashRequirements {
    let down = |amount: f32| (amount + ROUNDING_TOLERANCE).floor().max(0.0);
    WashRequirements::new(quantize(reqs.water, down), quantize(reqs.cleanser, down))
}

/// Usable water and cleanser charges in an inventory.
pub fn get_available(inv: &Inventory) -> WashRequirements {
    WashRequirements::new(
        inv.charges_among(&WATER_KINDS) as f32,
        inv.charges_among(&CLEANSER_KINDS) as f32,
    )
}

/// Total requirements over all targets.
pub fn calc_total(targets: &[WashTarget]) -> WashRequirements {
    targets
        .iter()
        .fold(WashRequirements::ZERO, |total, target| total + target.usage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::components::{ChargeKind, ItemId};

    fn samples() -> Vec<WashRequirements> {
        vec![
            WashRequirements::ZERO,
            WashRequirements::new(0.2, 0.33),
            WashRequirements::new(1.0, 2.0),
            WashRequirements::new(7.75, 0.999),
            WashRequirements::new(12.5, 3.1),
        ]
    }

    #[test]
    fn addition_commutes() {
        for a in samples() {
            for b in samples() {
                assert_eq!(a + b, b + a);
            }
        }
    }

    #[test]
    fn rounding_brackets_the_original() {
        for reqs in samples() {
            let down = round_down(&reqs);
            let up = round_up(&reqs);
            assert!(down.covered_by(&reqs));
            assert!(reqs.covered_by(&up));
            assert_eq!(down.water.fract(), 0.0);
            assert_eq!(up.cleanser.fract(), 0.0);
        }

        let exact = WashRequirements::new(3.0, 1.0);
        assert_eq!(round_up(&exact), exact);
        assert_eq!(round_down(&exact), exact);
    }

    #[test]
    fn rounding_ignores_float_drift() {
        // Fifteen fifths summed in f32 land a few ulps away from 3.0.
        let drifted = WashRequirements::new(3.000_000_4, 0.999_999_94);
        assert_eq!(round_up(&drifted), WashRequirements::new(3.0, 1.0));
        assert_eq!(round_down(&drifted), WashRequirements::new(3.0, 1.0));

        let real = WashRequirements::new(3.01, 0.98);
        assert_eq!(round_up(&real), WashRequirements::new(4.0, 1.0));
        assert_eq!(round_down(&real), WashRequirements::new(3.0, 0.0));
    }

    #[test]
    fn dust_is_dropped() {
        let reqs = WashRequirements::new(3.6e-7, 0.25);
        assert_eq!(reqs.without_dust(), WashRequirements::new(0.0, 0.25));
        assert_eq!(
            reqs.min(&WashRequirements::new(1.0, 0.1)),
            WashRequirements::new(3.6e-7, 0.1)
        );
    }

    #[test]
    fn unbounded_sentinel_survives_rounding() {
        let unbounded = WashRequirements::unbounded();
        assert_eq!(round_up(&unbounded), unbounded);
        assert_eq!(round_down(&unbounded), unbounded);
        assert_eq!(unbounded.charges(), (u32::MAX, u32::MAX));
        assert!(WashRequirements::new(5.0, 5.0).covered_by(&unbounded));
    }

    #[test]
    fn available_sums_interchangeable_charges() {
        let mut inventory = Inventory::default();
        inventory.add_charges(ChargeKind::Water, 3);
        inventory.add_charges(ChargeKind::CleanWater, 2);
        inventory.add_charges(ChargeKind::Detergent, 4);

        assert_eq!(get_available(&inventory), WashRequirements::new(5.0, 4.0));
    }

    #[test]
    fn total_sums_target_usage() {
        let targets = vec![
            WashTarget::new(ItemId::new(1), 2, WashRequirements::new(2.0, 0.4)),
            WashTarget::new(ItemId::new(2), 1, WashRequirements::new(8.0, 1.0)),
        ];
        let total = calc_total(&targets);
        assert!((total.water - 10.0).abs() < f32::EPSILON);
        assert!((total.cleanser - 1.4).abs() < 1e-6);
        assert_eq!(calc_total(&[]), WashRequirements::ZERO);
    }

    #[test]
    fn saturating_sub_and_charges() {
        let reqs = WashRequirements::new(2.5, 0.5);
        assert_eq!(
            reqs.saturating_sub(&WashRequirements::new(3.0, 0.25)),
            WashRequirements::new(0.0, 0.25)
        );
        assert_eq!(reqs.charges(), (2, 0));
        assert_eq!(reqs.scale(2.0), WashRequirements::new(5.0, 1.0));
    }
}
