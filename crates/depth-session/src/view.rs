//! What consumers observe

use depth_book::{BookSnapshot, BookStats, PublishedLevel};
use depth_types::{Symbol, Venue};
use serde::Serialize;

/// Published state of a session
///
/// Status fields change as soon as the session changes state; `bids` and
/// `asks` only change at the throttled rate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookView {
    pub venue: Option<Venue>,
    pub symbol: Option<Symbol>,
    /// Best (highest) bid first
    pub bids: Vec<PublishedLevel>,
    /// Best (lowest) ask first
    pub asks: Vec<PublishedLevel>,
    pub connected: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub stats: BookStats,
}

impl BookView {
    /// Both sides as a [`BookSnapshot`]
    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            bids: self.bids.clone(),
            asks: self.asks.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}
