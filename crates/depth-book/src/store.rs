//! Book State Store
//!
//! Authoritative bid/ask state for one session. Updates are applied strictly
//! in receipt order; nothing here reorders or buffers.

use crate::checksum;
use crate::side::{AskBook, BidBook, BookLevel};
use crate::snapshot::{self, BookSnapshot, MAX_VIEW_DEPTH};
use depth_types::{BookFrame, BookSide, CanonicalUpdate, FeedError, FeedResult, RawLevel, Venue};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Counters of applied updates since the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookStats {
    /// Side updates applied as snapshots
    pub snapshots: u64,
    /// Side updates applied as increments
    pub deltas: u64,
    /// Updates touching the bid side
    pub bid_updates: u64,
    /// Updates touching the ask side
    pub ask_updates: u64,
}

/// Both sides of one book
#[derive(Debug, Clone, Default)]
pub struct BookStore {
    bids: BidBook,
    asks: AskBook,
    stats: BookStats,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one side update, returning whether the side changed
    pub fn apply_update(&mut self, update: &CanonicalUpdate) -> bool {
        self.apply_side(update.side, &update.levels, update.is_snapshot)
    }

    /// Apply both sides of a frame, bids first
    ///
    /// A side with no levels in the frame is left untouched.
    pub fn apply_frame(&mut self, frame: &BookFrame) -> bool {
        let mut changed = false;
        if !frame.bids.is_empty() {
            changed |= self.apply_side(BookSide::Bid, &frame.bids, frame.is_snapshot);
        }
        if !frame.asks.is_empty() {
            changed |= self.apply_side(BookSide::Ask, &frame.asks, frame.is_snapshot);
        }
        changed
    }

    fn apply_side(&mut self, side: BookSide, levels: &[RawLevel], is_snapshot: bool) -> bool {
        if is_snapshot {
            self.stats.snapshots += 1;
        } else {
            self.stats.deltas += 1;
        }

        match side {
            BookSide::Bid => {
                self.stats.bid_updates += 1;
                if is_snapshot {
                    self.bids.apply_snapshot(levels)
                } else {
                    self.bids.apply_delta(levels)
                }
            }
            BookSide::Ask => {
                self.stats.ask_updates += 1;
                if is_snapshot {
                    self.asks.apply_snapshot(levels)
                } else {
                    self.asks.apply_delta(levels)
                }
            }
        }
    }

    /// Empty both sides and zero the counters
    pub fn reset(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.stats = BookStats::default();
    }

    /// Top `depth` levels per side (capped at 15), sizes to two decimals
    pub fn materialize(&self, depth: usize) -> BookSnapshot {
        snapshot::materialize(self.bids.levels(), self.asks.levels(), depth)
    }

    /// Top 15 levels per side
    pub fn materialize_default(&self) -> BookSnapshot {
        self.materialize(MAX_VIEW_DEPTH)
    }

    /// OKX checksum of the current state
    pub fn okx_checksum(&self) -> i32 {
        checksum::okx_checksum(self.bids.levels(), self.asks.levels())
    }

    /// Compare the current state against a venue checksum
    pub fn verify_okx_checksum(&self, expected: i32) -> FeedResult<()> {
        let computed = self.okx_checksum();
        if computed == expected {
            Ok(())
        } else {
            Err(FeedError::ChecksumMismatch {
                venue: Venue::Okx,
                expected,
                computed,
            })
        }
    }

    pub fn bids(&self) -> &BidBook {
        &self.bids
    }

    pub fn asks(&self) -> &AskBook {
        &self.asks
    }

    pub fn stats(&self) -> BookStats {
        self.stats
    }

    pub fn best_bid(&self) -> Option<&BookLevel> {
        self.bids.best()
    }

    pub fn best_ask(&self) -> Option<&BookLevel> {
        self.asks.best()
    }

    /// Get the spread (ask - bid)
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask()?.price - self.best_bid()?.price)
    }

    /// Get the mid price ((ask + bid) / 2)
    pub fn mid_price(&self) -> Option<Decimal> {
        Some((self.best_ask()?.price + self.best_bid()?.price) / Decimal::TWO)
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}
