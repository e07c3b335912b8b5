//! Bybit v5 spot `orderbook.{depth}.{symbol}` topic

use crate::adapter::VenueAdapter;
use crate::endpoint::Endpoint;
use depth_types::{BookFrame, FeedError, FeedResult, RawLevel, Venue};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Default spot book depth
pub const DEFAULT_BYBIT_DEPTH: u32 = 50;

/// Bybit subscription tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BybitOptions {
    /// Levels per side in the topic (1, 50 or 200 on spot)
    pub depth: u32,
}

impl Default for BybitOptions {
    fn default() -> Self {
        Self {
            depth: DEFAULT_BYBIT_DEPTH,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BybitMessage {
    Book(BybitBookPush),
    Ack(BybitAck),
    Other(BybitOther),
}

#[derive(Debug, Deserialize)]
struct BybitBookPush {
    topic: String,
    #[serde(rename = "type")]
    kind: BybitPushType,
    data: BybitBookData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum BybitPushType {
    Snapshot,
    Delta,
}

#[derive(Debug, Deserialize)]
struct BybitBookData {
    #[serde(rename = "b", default)]
    bids: Vec<RawLevel>,
    #[serde(rename = "a", default)]
    asks: Vec<RawLevel>,
}

/// Pongs, other topics and anything else without book data
#[derive(Debug, Deserialize)]
struct BybitOther {
    topic: Option<String>,
    op: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BybitAck {
    success: bool,
    #[serde(default)]
    ret_msg: String,
    op: Option<String>,
}

/// Adapter for one Bybit spot symbol
#[derive(Debug, Clone)]
pub struct BybitAdapter {
    symbol: String,
    topic: String,
    endpoint: Endpoint,
}

impl BybitAdapter {
    pub fn new(symbol: impl Into<String>, endpoint: Endpoint, options: BybitOptions) -> Self {
        let symbol = symbol.into();
        let topic = format!("orderbook.{}.{}", options.depth, symbol);
        Self {
            symbol,
            topic,
            endpoint,
        }
    }

    /// Topic subscribed to, e.g. `orderbook.50.BTCUSDT`
    pub fn topic(&self) -> &str {
        &self.topic
    }

    fn request(&self, op: &str) -> String {
        json!({ "op": op, "args": [self.topic] }).to_string()
    }
}

impl VenueAdapter for BybitAdapter {
    fn venue(&self) -> Venue {
        Venue::Bybit
    }

    fn endpoint(&self) -> Endpoint {
        self.endpoint.clone()
    }

    fn instrument(&self) -> &str {
        &self.symbol
    }

    fn subscribe_message(&self) -> String {
        self.request("subscribe")
    }

    fn unsubscribe_message(&self) -> String {
        self.request("unsubscribe")
    }

    fn decode(&self, frame: &str) -> FeedResult<Option<BookFrame>> {
        let message: BybitMessage =
            serde_json::from_str(frame).map_err(|e| FeedError::parse(Venue::Bybit, e))?;

        match message {
            BybitMessage::Book(push) => {
                if push.topic != self.topic {
                    return Ok(None);
                }
                let BybitBookData { bids, asks } = push.data;
                Ok(Some(match push.kind {
                    BybitPushType::Snapshot => BookFrame::snapshot(bids, asks),
                    BybitPushType::Delta => BookFrame::delta(bids, asks),
                }))
            }
            BybitMessage::Ack(ack) if !ack.success => Err(FeedError::Venue {
                venue: Venue::Bybit,
                code: None,
                message: ack.ret_msg,
            }),
            BybitMessage::Ack(ack) => {
                debug!(op = ?ack.op, topic = %self.topic, "Bybit request acknowledged");
                Ok(None)
            }
            BybitMessage::Other(other) => {
                if other.topic.as_deref() == Some(self.topic.as_str()) {
                    return Err(FeedError::parse(Venue::Bybit, "malformed book push"));
                }
                debug!(op = ?other.op, topic = ?other.topic, "Ignoring Bybit message");
                Ok(None)
            }
        }
    }
}
