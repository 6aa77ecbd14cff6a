//! Turns a selection of filthy items into wash targets, checking supplies up front.
use std::{collections::BTreeMap, fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

use crate::character::components::{Inventory, ItemId};

use super::{
    actor::{WashActivityActor, WashTarget},
    errors::WashError,
    requirements::{calc_total, get_available, round_up, WashRequirements},
};

const CONFIG_PATH: &str = "config/wash.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawWashConfig {
    ml_per_water_charge: f32,
    ml_per_cleanser_charge: f32,
    moves_per_250ml: f32,
}

impl Default for RawWashConfig {
    fn default() -> Self {
        Self {
            ml_per_water_charge: 250.0,
            ml_per_cleanser_charge: 1250.0,
            moves_per_250ml: 50.0,
        }
    }
}

/// Per-volume washing costs.
#[derive(Resource, Debug, Clone)]
pub struct WashSettings {
    /// Zero means washing needs no water.
    pub ml_per_water_charge: f32,
    /// Zero means washing needs no cleanser.
    pub ml_per_cleanser_charge: f32,
    pub moves_per_250ml: f32,
}

impl WashSettings {
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_PATH);
        match fs::read_to_string(path) {
            Ok(data) => match toml::from_str::<RawWashConfig>(&data) {
                Ok(raw) => raw.into(),
                Err(err) => {
                    warn!(
                        "Failed to parse {} ({}). Falling back to defaults.",
                        CONFIG_PATH, err
                    );
                    RawWashConfig::default().into()
                }
            },
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                RawWashConfig::default().into()
            }
        }
    }

    /// Requirement to wash one unit of the given volume.
    pub fn requirements_for_volume(&self, volume_ml: u32) -> WashRequirements {
        let charges = |ml_per_charge: f32| {
            if ml_per_charge > 0.0 {
                volume_ml as f32 / ml_per_charge
            } else {
                0.0
            }
        };
        WashRequirements::new(
            charges(self.ml_per_water_charge),
            charges(self.ml_per_cleanser_charge),
        )
    }

    pub fn moves_for_volume(&self, volume_ml: u32) -> f32 {
        volume_ml as f32 * self.moves_per_250ml / 250.0
    }
}

impl Default for WashSettings {
    fn default() -> Self {
        RawWashConfig::default().into()
    }
}

impl From<RawWashConfig> for WashSettings {
    fn from(value: RawWashConfig) -> Self {
        let sanitize = |value: f32| if value.is_finite() { value.max(0.0) } else { 0.0 };

        Self {
            ml_per_water_charge: sanitize(value.ml_per_water_charge),
            ml_per_cleanser_charge: sanitize(value.ml_per_cleanser_charge),
            moves_per_250ml: sanitize(value.moves_per_250ml),
        }
    }
}

/// How many units of an item stack the character wants washed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WashSelection {
    pub item: ItemId,
    pub count: u32,
}

impl WashSelection {
    pub fn new(item: ItemId, count: u32) -> Self {
        Self { item, count }
    }
}

/// Validated wash request, ready to become an activity.
#[derive(Debug, Clone, PartialEq)]
pub struct WashPlan {
    pub targets: Vec<WashTarget>,
    pub total_moves: i32,
    /// Whole charges reserved for the whole run.
    pub reserved: WashRequirements,
}

impl WashPlan {
    pub fn into_actor(self) -> Result<WashActivityActor, WashError> {
        WashActivityActor::new(self.targets, self.total_moves)
    }
}

/// Every filthy stack in full, in inventory order.
pub fn select_all_filthy(inv: &Inventory) -> Vec<WashSelection> {
    inv.items()
        .filter(|item| item.filthy && item.count > 0)
        .map(|item| WashSelection::new(item.id, item.count))
        .collect()
}

pub fn plan_wash(
    inv: &Inventory,
    selection: &[WashSelection],
    settings: &WashSettings,
) -> Result<WashPlan, WashError> {
    let mut merged: BTreeMap<ItemId, u32> = BTreeMap::new();
    for entry in selection.iter().filter(|entry| entry.count > 0) {
        let total = merged.entry(entry.item).or_default();
        *total = total.saturating_add(entry.count);
    }
    if merged.is_empty() {
        return Err(WashError::NothingToWash);
    }

    let mut targets = Vec::with_capacity(merged.len());
    let mut total_moves = 0.0_f32;
    for (id, count) in merged {
        let item = inv.item(id).ok_or(WashError::UnknownItem(id))?;
        if !item.filthy {
            return Err(WashError::NotFilthy(id));
        }
        if count > item.count {
            return Err(WashError::NotEnoughItems {
                item: id,
                requested: count,
                available: item.count,
            });
        }

        let usage = settings
            .requirements_for_volume(item.volume_ml)
            .scale(count as f32);
        total_moves += settings.moves_for_volume(item.volume_ml) * count as f32;
        targets.push(WashTarget::new(id, count, usage));
    }

    let reserved = round_up(&calc_total(&targets));
    let available = get_available(inv);
    let (water_needed, cleanser_needed) = reserved.charges();
    let (water_available, cleanser_available) = available.charges();
    if water_needed > water_available {
        return Err(WashError::InsufficientWater {
            needed: water_needed,
            available: water_available,
        });
    }
    if cleanser_needed > cleanser_available {
        return Err(WashError::InsufficientCleanser {
            needed: cleanser_needed,
            available: cleanser_available,
        });
    }

    Ok(WashPlan {
        targets,
        total_moves: total_moves.round() as i32,
        reserved,
    })
}
