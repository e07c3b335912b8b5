//! One side of the book, kept in best-first order
//!
//! Bids are keyed by `Reverse<Decimal>` so the map iterates highest first,
//! asks by `Decimal` so it iterates lowest first. Both sides share one
//! implementation through [`PriceKey`].

use depth_types::RawLevel;
use rust_decimal::Decimal;
use std::cmp::Reverse;
use std::collections::btree_map;
use std::collections::BTreeMap;
use tracing::warn;

/// Map key that orders prices best-first for its side
pub trait PriceKey: Ord + Copy + std::fmt::Debug {
    fn from_price(price: Decimal) -> Self;
}

impl PriceKey for Decimal {
    fn from_price(price: Decimal) -> Self {
        price
    }
}

impl PriceKey for Reverse<Decimal> {
    fn from_price(price: Decimal) -> Self {
        Reverse(price)
    }
}

/// A stored level
///
/// The wire text is kept next to the parsed values: the published view shows
/// prices as the venue sent them and the OKX checksum hashes the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookLevel {
    pub price: Decimal,
    pub size: Decimal,
    pub price_text: String,
    pub size_text: String,
}

impl BookLevel {
    fn from_raw(raw: &RawLevel, price: Decimal, size: Decimal) -> Self {
        Self {
            price,
            size,
            price_text: raw.price.clone(),
            size_text: raw.size.clone(),
        }
    }
}

/// Price -> level map for one side
#[derive(Debug, Clone)]
pub struct SideBook<K: PriceKey> {
    levels: BTreeMap<K, BookLevel>,
}

/// Bid side, highest price first
pub type BidBook = SideBook<Reverse<Decimal>>;
/// Ask side, lowest price first
pub type AskBook = SideBook<Decimal>;

impl<K: PriceKey> Default for SideBook<K> {
    fn default() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }
}

impl<K: PriceKey> SideBook<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the side with `levels`
    ///
    /// Levels whose size is missing, zero or negative are dropped. Returns
    /// true unless the side was empty and stays empty.
    pub fn apply_snapshot(&mut self, levels: &[RawLevel]) -> bool {
        let was_empty = self.levels.is_empty();
        self.levels.clear();

        for raw in levels {
            let Some(price) = parse_price(raw) else {
                continue;
            };
            match raw.parse_size() {
                Some(size) if size > Decimal::ZERO => {
                    self.levels
                        .insert(K::from_price(price), BookLevel::from_raw(raw, price, size));
                }
                _ => {}
            }
        }

        !(was_empty && self.levels.is_empty())
    }

    /// Merge `levels` into the side in order
    ///
    /// A size that is zero, negative or unparseable removes the price (absent
    /// prices are ignored), anything else inserts or overwrites it. Returns
    /// true if at least one level changed.
    pub fn apply_delta(&mut self, levels: &[RawLevel]) -> bool {
        let mut changed = false;

        for raw in levels {
            let Some(price) = parse_price(raw) else {
                continue;
            };
            changed |= match raw.parse_size() {
                Some(size) if size > Decimal::ZERO => {
                    self.upsert(BookLevel::from_raw(raw, price, size))
                }
                _ => self.remove(price),
            };
        }

        changed
    }

    /// Insert or overwrite a level, returning true if the side changed
    pub fn upsert(&mut self, level: BookLevel) -> bool {
        match self.levels.entry(K::from_price(level.price)) {
            btree_map::Entry::Occupied(mut entry) => {
                if entry.get() == &level {
                    return false;
                }
                entry.insert(level);
                true
            }
            btree_map::Entry::Vacant(entry) => {
                entry.insert(level);
                true
            }
        }
    }

    /// Remove a price, returning true if it was present
    pub fn remove(&mut self, price: Decimal) -> bool {
        self.levels.remove(&K::from_price(price)).is_some()
    }

    /// Best level of the side
    pub fn best(&self) -> Option<&BookLevel> {
        self.levels.values().next()
    }

    /// Levels, best first
    pub fn levels(&self) -> btree_map::Values<'_, K, BookLevel> {
        self.levels.values()
    }

    /// Size stored at `price`
    pub fn size_at(&self, price: Decimal) -> Option<Decimal> {
        self.levels.get(&K::from_price(price)).map(|l| l.size)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }
}

fn parse_price(raw: &RawLevel) -> Option<Decimal> {
    let price = raw.parse_price();
    if price.is_none() {
        warn!(price = %raw.price, size = %raw.size, "Skipping level with unparseable price");
    }
    price
}
