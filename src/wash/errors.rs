//! Errors raised while planning a wash.
use std::fmt;

use crate::character::components::ItemId;

#[derive(Debug, Clone, PartialEq)]
pub enum WashError {
    NothingToWash,
    UnknownItem(ItemId),
    NotFilthy(ItemId),
    NotEnoughItems {
        item: ItemId,
        requested: u32,
        available: u32,
    },
    InsufficientWater { needed: u32, available: u32 },
    InsufficientCleanser { needed: u32, available: u32 },
}

impl fmt::Display for WashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToWash => write!(f, "Nothing selected to wash"),
            Self::UnknownItem(item) => write!(f, "No such item: {}", item),
            Self::NotFilthy(item) => write!(f, "{} is not filthy", item),
            Self::NotEnoughItems {
                item,
                requested,
                available,
            } => write!(
                f,
                "Requested {} of {} but only {} are filthy",
                requested, item, available
            ),
            Self::InsufficientWater { needed, available } => write!(
                f,
                "You need {} charges of water to wash these items, but only have {}",
                needed, available
            ),
            Self::InsufficientCleanser { needed, available } => write!(
                f,
                "You need {} charges of cleansing agent to wash these items, but only have {}",
                needed, available
            ),
        }
    }
}

impl std::error::Error for WashError {}
