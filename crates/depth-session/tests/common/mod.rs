//! Common test utilities and fixtures for session tests
//!
//! Frames follow the shapes the venues send on their public book channels.

#![allow(dead_code)]

use depth_book::BookStore;
use depth_session::{BookView, SessionConfig, SessionController};
use depth_types::{BookFrame, RawLevel};
use depth_ws::{MockConnector, MockHandle};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing_subscriber::EnvFilter;

pub const OKX_INST: &str = "BTC-USDT";
pub const BYBIT_TOPIC: &str = "orderbook.50.BTCUSDT";
pub const DERIBIT_CHANNEL: &str = "book.BTC-PERPETUAL.100ms";

/// OKX subscribe acknowledgement
pub const OKX_SUBSCRIBE_ACK: &str =
    r#"{"event":"subscribe","arg":{"channel":"books","instId":"BTC-USDT"},"connId":"a4d3ae55"}"#;

/// Bybit subscribe acknowledgement
pub const BYBIT_SUBSCRIBE_ACK: &str =
    r#"{"success":true,"ret_msg":"subscribe","conn_id":"2324d924-1c4d-44c1-87e4-2ba0e4dc5d50","op":"subscribe"}"#;

/// Deribit heartbeat notification
pub const DERIBIT_HEARTBEAT: &str = r#"{"jsonrpc":"2.0","method":"heartbeat","params":{"type":"heartbeat"}}"#;

/// Route session logs to the test output, filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn controller(config: SessionConfig) -> (SessionController, MockConnector) {
    init_tracing();
    let connector = MockConnector::new();
    let controller = SessionController::new(config, Arc::new(connector.clone()));
    (controller, connector)
}

fn raw(levels: &[(&str, &str)]) -> Vec<RawLevel> {
    levels.iter().map(|(p, s)| RawLevel::new(*p, *s)).collect()
}

/// Checksum OKX would attach to a snapshot of these levels
pub fn okx_snapshot_checksum(bids: &[(&str, &str)], asks: &[(&str, &str)]) -> i32 {
    let mut store = BookStore::new();
    store.apply_frame(&BookFrame::snapshot(raw(bids), raw(asks)));
    store.okx_checksum()
}

pub fn okx_frame(
    action: &str,
    bids: &[(&str, &str)],
    asks: &[(&str, &str)],
    seq_id: i64,
    prev_seq_id: i64,
    checksum: Option<i32>,
) -> String {
    let levels = |levels: &[(&str, &str)]| -> Vec<serde_json::Value> {
        levels.iter().map(|(p, s)| json!([p, s, "0", "1"])).collect()
    };
    let mut data = json!({
        "asks": levels(asks),
        "bids": levels(bids),
        "ts": "1597026383085",
        "seqId": seq_id,
        "prevSeqId": prev_seq_id,
    });
    if let Some(checksum) = checksum {
        data["checksum"] = json!(checksum);
    }
    json!({
        "arg": {"channel": "books", "instId": OKX_INST},
        "action": action,
        "data": [data],
    })
    .to_string()
}

/// OKX snapshot carrying its correct checksum
pub fn okx_snapshot(bids: &[(&str, &str)], asks: &[(&str, &str)], seq_id: i64) -> String {
    let checksum = okx_snapshot_checksum(bids, asks);
    okx_frame("snapshot", bids, asks, seq_id, -1, Some(checksum))
}

pub fn bybit_frame_for(topic: &str, kind: &str, bids: &[(&str, &str)], asks: &[(&str, &str)]) -> String {
    let symbol = topic.rsplit('.').next().unwrap_or_default();
    json!({
        "topic": topic,
        "ts": 1672304484978u64,
        "type": kind,
        "data": {"s": symbol, "b": bids, "a": asks, "u": 18521288, "seq": 7961638724u64},
        "cts": 1672304484976u64,
    })
    .to_string()
}

pub fn bybit_frame(kind: &str, bids: &[(&str, &str)], asks: &[(&str, &str)]) -> String {
    bybit_frame_for(BYBIT_TOPIC, kind, bids, asks)
}

/// Raw Deribit notification; levels are `(action, price, amount)`
pub fn deribit_frame(
    kind: &str,
    change_id: i64,
    prev_change_id: Option<i64>,
    bids: &[(&str, f64, f64)],
    asks: &[(&str, f64, f64)],
) -> String {
    let levels = |levels: &[(&str, f64, f64)]| -> Vec<serde_json::Value> {
        levels.iter().map(|(a, p, s)| json!([a, p, s])).collect()
    };
    let mut data = json!({
        "type": kind,
        "timestamp": 1554373962454u64,
        "instrument_name": "BTC-PERPETUAL",
        "change_id": change_id,
        "bids": levels(bids),
        "asks": levels(asks),
    });
    if let Some(prev) = prev_change_id {
        data["prev_change_id"] = json!(prev);
    }
    json!({
        "jsonrpc": "2.0",
        "method": "subscription",
        "params": {"channel": DERIBIT_CHANNEL, "data": data},
    })
    .to_string()
}

/// Wait until the connector has handed out `count` transports
pub async fn wait_for_transport(connector: &MockConnector, count: usize) -> MockHandle {
    timeout(Duration::from_secs(2), async {
        loop {
            if connector.created() >= count {
                if let Some(handle) = connector.handles().get(count - 1) {
                    return handle.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("Transport should be created")
}

/// Wait for a published view matching `predicate`
pub async fn wait_for_view(
    views: &mut watch::Receiver<BookView>,
    predicate: impl Fn(&BookView) -> bool,
) -> BookView {
    timeout(Duration::from_secs(2), async {
        loop {
            {
                let view = views.borrow_and_update();
                if predicate(&view) {
                    return view.clone();
                }
            }
            views.changed().await.expect("Session should still be running");
        }
    })
    .await
    .expect("View should be published")
}
