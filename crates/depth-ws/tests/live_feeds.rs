//! Live feed tests against the public venue endpoints
//!
//! These tests make real WebSocket connections.
//! Run with: cargo test -p depth-ws --test live_feeds -- --ignored

use depth_types::{DefaultSymbolMapper, Symbol, SymbolMapper, Venue};
use depth_ws::{build_adapter, Feed, VenueOptions, WsTransport};
use std::time::Duration;
use tokio::time::timeout;

/// Open a feed and wait for the first snapshot frame
async fn first_snapshot(venue: Venue, symbol: &str) -> bool {
    let instrument = DefaultSymbolMapper
        .resolve(&Symbol::new(symbol), venue)
        .expect("Pair should be supported");
    let adapter = build_adapter(venue, &instrument, &VenueOptions::default());
    let transport = WsTransport::new(adapter.endpoint().url());
    let mut feed = Feed::new(adapter, Box::new(transport));

    feed.open().await.expect("Should connect and subscribe");

    let result = timeout(Duration::from_secs(15), async {
        while let Ok(Some(text)) = feed.recv().await {
            if let Ok(Some(frame)) = feed.decode(&text) {
                if frame.is_snapshot {
                    return true;
                }
            }
        }
        false
    })
    .await;

    feed.close().await;
    matches!(result, Ok(true))
}

#[tokio::test]
#[ignore = "Makes real WebSocket connection"]
async fn test_okx_snapshot() {
    assert!(first_snapshot(Venue::Okx, "BTC-USDT").await, "Should receive an OKX snapshot");
}

#[tokio::test]
#[ignore = "Makes real WebSocket connection"]
async fn test_bybit_snapshot() {
    assert!(first_snapshot(Venue::Bybit, "BTC-USD").await, "Should receive a Bybit snapshot");
}

#[tokio::test]
#[ignore = "Makes real WebSocket connection"]
async fn test_deribit_snapshot() {
    assert!(first_snapshot(Venue::Deribit, "ETH-USD").await, "Should receive a Deribit snapshot");
}
