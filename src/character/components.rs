//! Character components: move budget, activity level and a small item inventory.
use std::{collections::HashMap, fmt};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Stable identifier for an item stack inside an inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{:04}", self.0)
    }
}

/// Consumable resources stored as discrete charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeKind {
    Water,
    CleanWater,
    Soap,
    Detergent,
}

impl ChargeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::CleanWater => "clean water",
            Self::Soap => "soap",
            Self::Detergent => "detergent",
        }
    }
}

/// Charge kinds usable as washing water, in the order they are consumed.
pub const WATER_KINDS: [ChargeKind; 2] = [ChargeKind::Water, ChargeKind::CleanWater];
/// Charge kinds usable as cleanser, in the order they are consumed.
pub const CLEANSER_KINDS: [ChargeKind; 2] = [ChargeKind::Soap, ChargeKind::Detergent];

/// A stack of identical items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub volume_ml: u32,
    pub count: u32,
    pub filthy: bool,
}

/// Inventory storing item stacks plus consumable charges.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    items: Vec<Item>,
    charges: HashMap<ChargeKind, u32>,
    next_id: u64,
}

impl Inventory {
    pub fn add_item(
        &mut self,
        name: impl Into<String>,
        volume_ml: u32,
        count: u32,
        filthy: bool,
    ) -> ItemId {
        let id = self.allocate_id();
        self.items.push(Item {
            id,
            name: name.into(),
            volume_ml,
            count,
            filthy,
        });
        id
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter()
    }

    pub fn filthy_count(&self) -> u32 {
        self.items
            .iter()
            .filter(|item| item.filthy)
            .map(|item| item.count)
            .sum()
    }

    pub fn add_charges(&mut self, kind: ChargeKind, amount: u32) {
        if amount == 0 {
            return;
        }
        let entry = self.charges.entry(kind).or_default();
        *entry = entry.saturating_add(amount);
    }

    pub fn charges_of(&self, kind: ChargeKind) -> u32 {
        self.charges.get(&kind).copied().unwrap_or(0)
    }

    /// Total charges across several interchangeable kinds.
    pub fn charges_among(&self, kinds: &[ChargeKind]) -> u32 {
        kinds
            .iter()
            .map(|kind| self.charges_of(*kind))
            .fold(0, u32::saturating_add)
    }

    /// Consumes up to `amount` charges, draining `kinds` in order. Returns how many were used.
    pub fn use_charges(&mut self, kinds: &[ChargeKind], amount: u32) -> u32 {
        let mut remaining = amount;
        for kind in kinds {
            if remaining == 0 {
                break;
            }
            if let Some(stored) = self.charges.get_mut(kind) {
                let taken = (*stored).min(remaining);
                *stored -= taken;
                remaining -= taken;
                if *stored == 0 {
                    self.charges.remove(kind);
                }
            }
        }
        amount - remaining
    }

    /// Marks up to `count` units of a filthy stack as clean, splitting the stack when
    /// only part of it is washed. The filthy remainder keeps its id. Returns units cleaned.
    pub fn mark_clean(&mut self, id: ItemId, count: u32) -> u32 {
        let Some(position) = self
            .items
            .iter()
            .position(|item| item.id == id && item.filthy)
        else {
            return 0;
        };

        let washed = count.min(self.items[position].count);
        if washed == 0 {
            return 0;
        }
        if washed == self.items[position].count {
            self.items[position].filthy = false;
            return washed;
        }

        self.items[position].count -= washed;
        let (name, volume_ml) = {
            let source = &self.items[position];
            (source.name.clone(), source.volume_ml)
        };
        if let Some(clean) = self
            .items
            .iter_mut()
            .find(|item| !item.filthy && item.name == name && item.volume_ml == volume_ml)
        {
            clean.count = clean.count.saturating_add(washed);
        } else {
            let clean_id = self.allocate_id();
            self.items.push(Item {
                id: clean_id,
                name,
                volume_ml,
                count: washed,
                filthy: false,
            });
        }
        washed
    }

    fn allocate_id(&mut self) -> ItemId {
        let id = ItemId::new(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Messages kept per character; older ones are dropped first.
const MESSAGE_LOG_CAPACITY: usize = 64;

/// The acting character: move budget, exertion and belongings.
#[derive(Component, Debug, Clone)]
pub struct Character {
    pub name: String,
    /// Moves available this turn; activities spend them.
    pub moves: i32,
    pub speed: i32,
    activity_level: f32,
    pub inventory: Inventory,
    messages: Vec<String>,
}

impl Character {
    pub fn new(name: impl Into<String>, speed: i32) -> Self {
        Self {
            name: name.into(),
            moves: 0,
            speed: speed.max(1),
            activity_level: 0.0,
            inventory: Inventory::default(),
            messages: Vec::new(),
        }
    }

    pub fn activity_level(&self) -> f32 {
        self.activity_level
    }

    pub fn set_activity_level(&mut self, level: f32) {
        self.activity_level = level.max(0.0);
    }

    /// Grants this turn's move budget.
    pub fn gain_moves(&mut self, moves_per_turn: i32) {
        self.moves = moves_per_turn.max(0) * self.speed / 100;
    }

    pub fn add_msg(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("[{}] {}", self.name, message);
        if self.messages.len() >= MESSAGE_LOG_CAPACITY {
            let excess = self.messages.len() + 1 - MESSAGE_LOG_CAPACITY;
            self.messages.drain(..excess);
        }
        self.messages.push(message);
    }

    /// Most recent messages, oldest first.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}
