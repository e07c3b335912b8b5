//! WebSocket transport and venue adapters for order book feeds
//!
//! This crate connects to the public book channels of OKX, Bybit and Deribit
//! and turns their wire messages into [`BookFrame`](depth_types::BookFrame)s.
//!
//! # Example
//!
//! ```no_run
//! use depth_ws::{build_adapter, Feed, VenueOptions, WsTransport};
//! use depth_types::Venue;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = build_adapter(Venue::Bybit, "BTCUSDT", &VenueOptions::default());
//!     let transport = WsTransport::new(adapter.endpoint().url());
//!     let mut feed = Feed::new(adapter, Box::new(transport));
//!     feed.open().await?;
//!
//!     while let Some(text) = feed.recv().await? {
//!         if let Some(frame) = feed.decode(&text)? {
//!             println!("{} bids, {} asks", frame.bids.len(), frame.asks.len());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod endpoint;
pub mod feed;
pub mod transport;
pub mod venues;

// Re-export main types
pub use adapter::{build_adapter, VenueAdapter, VenueOptions};
pub use endpoint::Endpoint;
pub use feed::Feed;
pub use transport::{Connector, Transport, TransportError, WsConnector, WsTransport};
pub use venues::{
    BybitAdapter, BybitOptions, DeribitAdapter, DeribitOptions, OkxAdapter, UpdateMode,
};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::{MockConnector, MockHandle, MockTransport};
