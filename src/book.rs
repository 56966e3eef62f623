//! Side book - an ordered map from price to level for one side.
//!
//! Backed by a balanced tree so best-price access is a first/last key
//! lookup and iteration comes out best-first without a separate cache to
//! invalidate: bids iterate descending, asks ascending.

use std::collections::BTreeMap;

use crate::events::{Price, Qty, Side};
use crate::price_level::Level;

/// Aggregate view of one price level, as reported by depth queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelView {
    pub price: Price,
    pub total_volume: Qty,
    pub order_count: u32,
}

/// Ordered `price -> Level` map for one side of the book.
///
/// Empty levels are erased by the caller as soon as their last order leaves,
/// so every stored level is non-empty.
#[derive(Debug)]
pub struct SideBook {
    side: Side,
    levels: BTreeMap<Price, Level>,
}

impl SideBook {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Best price on this side: highest for bids, lowest for asks.
    #[inline]
    pub fn best_price(&self) -> Option<Price> {
        match self.side {
            Side::Buy => self.levels.last_key_value().map(|(price, _)| *price),
            Side::Sell => self.levels.first_key_value().map(|(price, _)| *price),
        }
    }

    /// Best price and its level.
    #[inline]
    pub fn best(&self) -> Option<(Price, &Level)> {
        match self.side {
            Side::Buy => self.levels.last_key_value().map(|(price, level)| (*price, level)),
            Side::Sell => self.levels.first_key_value().map(|(price, level)| (*price, level)),
        }
    }

    #[inline]
    pub fn get(&self, price: Price) -> Option<&Level> {
        self.levels.get(&price)
    }

    #[inline]
    pub fn get_mut(&mut self, price: Price) -> Option<&mut Level> {
        self.levels.get_mut(&price)
    }

    /// Existing level at `price`, or a freshly created empty one.
    #[inline]
    pub fn find_or_create(&mut self, price: Price) -> &mut Level {
        self.levels.entry(price).or_insert_with(Level::new)
    }

    #[inline]
    pub fn erase(&mut self, price: Price) {
        self.levels.remove(&price);
    }

    /// Number of price levels on this side.
    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Levels in matching priority order: descending prices for bids,
    /// ascending for asks.
    pub fn iter_best_first(&self) -> Box<dyn Iterator<Item = (Price, &Level)> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.iter().rev().map(|(price, level)| (*price, level))),
            Side::Sell => Box::new(self.levels.iter().map(|(price, level)| (*price, level))),
        }
    }
}
