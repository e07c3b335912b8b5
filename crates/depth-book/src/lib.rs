//! Order book engine for venue depth feeds
//!
//! This crate holds the authoritative book state of a session and turns it
//! into the bounded view consumers see. It is synchronous and has no I/O.
//!
//! # Example
//!
//! ```
//! use depth_book::BookStore;
//! use depth_types::{BookFrame, RawLevel};
//!
//! let mut store = BookStore::new();
//! store.apply_frame(&BookFrame::snapshot(
//!     vec![RawLevel::new("100", "1.5")],
//!     vec![RawLevel::new("101", "2")],
//! ));
//!
//! let view = store.materialize_default();
//! assert_eq!(view.bids[0].size, "1.50");
//! ```

pub mod checksum;
pub mod impact;
pub mod sequence;
pub mod side;
pub mod snapshot;
pub mod store;

// Re-export main types
pub use checksum::{okx_checksum, OKX_CHECKSUM_DEPTH};
pub use impact::{
    cumulative_depth, simulate, DepthPoint, FillEstimate, ImpactError, ImpactReport, OrderSide,
    SimulatedOrder,
};
pub use sequence::SequenceTracker;
pub use side::{AskBook, BidBook, BookLevel, SideBook};
pub use snapshot::{format_size, BookSnapshot, PublishedLevel, MAX_VIEW_DEPTH};
pub use store::{BookStats, BookStore};
