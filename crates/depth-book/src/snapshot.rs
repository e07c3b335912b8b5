//! Materialized top-of-book view

use crate::side::BookLevel;
use depth_types::parse_decimal;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Maximum number of levels published per side
pub const MAX_VIEW_DEPTH: usize = 15;

/// Decimal places of a published size
pub const SIZE_DECIMALS: u32 = 2;

/// A level as shown to consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedLevel {
    /// Price as the venue sent it
    pub price: String,
    /// Size with exactly two decimals
    pub size: String,
}

impl PublishedLevel {
    pub fn new(price: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            price: price.into(),
            size: size.into(),
        }
    }

    pub fn price_decimal(&self) -> Option<Decimal> {
        parse_decimal(&self.price)
    }

    pub fn size_decimal(&self) -> Option<Decimal> {
        parse_decimal(&self.size)
    }
}

/// Bounded, sorted view of both sides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    /// Best (highest) bid first
    pub bids: Vec<PublishedLevel>,
    /// Best (lowest) ask first
    pub asks: Vec<PublishedLevel>,
}

impl BookSnapshot {
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().and_then(PublishedLevel::price_decimal)
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().and_then(PublishedLevel::price_decimal)
    }

    /// Midpoint of the best bid and ask
    pub fn mid_price(&self) -> Option<Decimal> {
        Some((self.best_bid()? + self.best_ask()?) / Decimal::TWO)
    }

    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask()? - self.best_bid()?)
    }
}

/// Build a view from best-first level iterators
///
/// `depth` is capped at [`MAX_VIEW_DEPTH`].
pub fn materialize<'a>(
    bids: impl Iterator<Item = &'a BookLevel>,
    asks: impl Iterator<Item = &'a BookLevel>,
    depth: usize,
) -> BookSnapshot {
    let depth = depth.min(MAX_VIEW_DEPTH);
    BookSnapshot {
        bids: bids.take(depth).map(publish).collect(),
        asks: asks.take(depth).map(publish).collect(),
    }
}

fn publish(level: &BookLevel) -> PublishedLevel {
    PublishedLevel {
        price: level.price_text.clone(),
        size: format_size(level.size),
    }
}

/// Round half away from zero to two decimals and render with both digits
pub fn format_size(size: Decimal) -> String {
    let rounded = size.round_dp_with_strategy(SIZE_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(dec!(1)), "1.00");
        assert_eq!(format_size(dec!(1.5)), "1.50");
        assert_eq!(format_size(dec!(0.125)), "0.13");
        assert_eq!(format_size(dec!(0.004)), "0.00");
        assert_eq!(format_size(dec!(12.3456)), "12.35");
    }

    #[test]
    fn test_snapshot_prices() {
        let snapshot = BookSnapshot {
            bids: vec![PublishedLevel::new("99", "1.00")],
            asks: vec![PublishedLevel::new("101", "2.00")],
        };
        assert_eq!(snapshot.mid_price(), Some(dec!(100)));
        assert_eq!(snapshot.spread(), Some(dec!(2)));
        assert_eq!(BookSnapshot::default().mid_price(), None);
    }
}
