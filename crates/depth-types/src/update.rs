//! Canonical book updates produced by venue adapters

use crate::level::RawLevel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bid or ask half of an order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookSide {
    /// Buy interest, best = highest price
    Bid,
    /// Sell interest, best = lowest price
    Ask,
}

impl BookSide {
    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Self::Bid => Self::Ask,
            Self::Ask => Self::Bid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bid => "bid",
            Self::Ask => "ask",
        }
    }
}

impl fmt::Display for BookSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Venue sequence numbers attached to a frame
///
/// `previous` is the sequence the venue says this frame follows. It is absent
/// on snapshots from venues that do not link a snapshot to anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceInfo {
    /// Sequence of this frame
    pub sequence: i64,
    /// Sequence of the frame this one follows
    pub previous: Option<i64>,
}

impl SequenceInfo {
    pub fn new(sequence: i64, previous: Option<i64>) -> Self {
        Self { sequence, previous }
    }
}

/// One decoded book frame: both sides as they appeared together on the wire
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookFrame {
    /// Bid levels in wire order
    pub bids: Vec<RawLevel>,
    /// Ask levels in wire order
    pub asks: Vec<RawLevel>,
    /// Whether the frame replaces the sides it carries
    pub is_snapshot: bool,
    /// Venue sequencing, when the venue provides it
    pub sequence: Option<SequenceInfo>,
    /// Venue checksum of the book after this frame (OKX only)
    pub checksum: Option<i32>,
}

impl BookFrame {
    /// Frame that replaces the sides it carries
    pub fn snapshot(bids: Vec<RawLevel>, asks: Vec<RawLevel>) -> Self {
        Self {
            bids,
            asks,
            is_snapshot: true,
            ..Default::default()
        }
    }

    /// Frame that merges into existing state
    pub fn delta(bids: Vec<RawLevel>, asks: Vec<RawLevel>) -> Self {
        Self {
            bids,
            asks,
            is_snapshot: false,
            ..Default::default()
        }
    }

    /// Attach venue sequencing
    pub fn with_sequence(mut self, sequence: SequenceInfo) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Attach a venue checksum
    pub fn with_checksum(mut self, checksum: i32) -> Self {
        self.checksum = Some(checksum);
        self
    }

    /// True if neither side carries levels
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Split into per-side updates
    ///
    /// A side with no levels yields no update, so an empty side inside a
    /// snapshot frame leaves that side of the book untouched.
    pub fn into_updates(self) -> Vec<CanonicalUpdate> {
        let mut updates = Vec::with_capacity(2);
        if !self.bids.is_empty() {
            updates.push(CanonicalUpdate {
                side: BookSide::Bid,
                levels: self.bids,
                is_snapshot: self.is_snapshot,
            });
        }
        if !self.asks.is_empty() {
            updates.push(CanonicalUpdate {
                side: BookSide::Ask,
                levels: self.asks,
                is_snapshot: self.is_snapshot,
            });
        }
        updates
    }
}

/// Instruction to mutate one side of the book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalUpdate {
    /// Side to mutate
    pub side: BookSide,
    /// Levels in wire order
    pub levels: Vec<RawLevel>,
    /// Replace the side (true) or merge into it (false)
    pub is_snapshot: bool,
}

impl CanonicalUpdate {
    pub fn snapshot(side: BookSide, levels: Vec<RawLevel>) -> Self {
        Self {
            side,
            levels,
            is_snapshot: true,
        }
    }

    pub fn delta(side: BookSide, levels: Vec<RawLevel>) -> Self {
        Self {
            side,
            levels,
            is_snapshot: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_splits_into_sides() {
        let frame = BookFrame::snapshot(
            vec![RawLevel::new("100", "1")],
            vec![RawLevel::new("101", "2")],
        );
        let updates = frame.into_updates();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].side, BookSide::Bid);
        assert_eq!(updates[1].side, BookSide::Ask);
        assert!(updates.iter().all(|u| u.is_snapshot));
    }

    #[test]
    fn test_empty_side_yields_no_update() {
        let frame = BookFrame::delta(vec![], vec![RawLevel::new("101", "0")]);
        let updates = frame.into_updates();
        assert_eq!(updates, vec![CanonicalUpdate::delta(BookSide::Ask, vec![RawLevel::new("101", "0")])]);
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(BookSide::Bid.opposite(), BookSide::Ask);
        assert_eq!(BookSide::Ask.to_string(), "ask");
    }
}
