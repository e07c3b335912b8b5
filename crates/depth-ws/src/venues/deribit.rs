//! Deribit JSON-RPC `book.*` channels
//!
//! Two channel families are supported:
//!
//! - raw: `book.{instrument}.{interval}`, levels `[action, price, amount]`
//!   with `type: snapshot|change` and `change_id`/`prev_change_id`
//! - grouped: `book.{instrument}.none.{depth}.{interval}`, levels
//!   `[price, amount]`

use crate::adapter::VenueAdapter;
use crate::endpoint::Endpoint;
use depth_types::{BookFrame, FeedError, FeedResult, RawLevel, SequenceInfo, StringOrNumber, Venue};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use std::str::FromStr;
use tracing::debug;

/// JSON-RPC id used for subscribe and unsubscribe requests
pub const SUBSCRIPTION_REQUEST_ID: u64 = 42;

/// Notification interval of the public channels
pub const DEFAULT_DERIBIT_INTERVAL: &str = "100ms";

/// How a book notification is classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Follow the `type` field; a missing field means incremental
    #[default]
    Flagged,
    /// Merge every notification
    AlwaysIncremental,
    /// Replace the book with every notification
    AlwaysSnapshot,
}

impl FromStr for UpdateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flagged" => Ok(Self::Flagged),
            "incremental" => Ok(Self::AlwaysIncremental),
            "snapshot" => Ok(Self::AlwaysSnapshot),
            other => Err(format!(
                "unknown update mode '{other}', expected flagged, incremental or snapshot"
            )),
        }
    }
}

/// Deribit subscription tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeribitOptions {
    pub update_mode: UpdateMode,
    /// Subscribe to the grouped channel with this many levels instead of raw
    pub grouped_depth: Option<u32>,
    pub interval: String,
}

impl Default for DeribitOptions {
    fn default() -> Self {
        Self {
            update_mode: UpdateMode::Flagged,
            grouped_depth: None,
            interval: DEFAULT_DERIBIT_INTERVAL.to_string(),
        }
    }
}

impl DeribitOptions {
    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }

    pub fn with_grouped_depth(mut self, depth: u32) -> Self {
        self.grouped_depth = Some(depth);
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DeribitMessage {
    Notification(DeribitNotification),
    Response(DeribitResponse),
    Other(DeribitOther),
}

#[derive(Debug, Deserialize)]
struct DeribitNotification {
    params: DeribitParams,
}

#[derive(Debug, Deserialize)]
struct DeribitParams {
    channel: String,
    data: DeribitBookData,
}

#[derive(Debug, Deserialize)]
struct DeribitBookData {
    #[serde(rename = "type")]
    kind: Option<String>,
    change_id: Option<i64>,
    prev_change_id: Option<i64>,
    #[serde(default)]
    bids: Vec<DeribitLevel>,
    #[serde(default)]
    asks: Vec<DeribitLevel>,
}

#[derive(Debug, Deserialize)]
struct DeribitResponse {
    id: u64,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct DeribitOther {
    method: Option<String>,
}

/// A Deribit level in either channel shape
#[derive(Debug)]
struct DeribitLevel(RawLevel);

impl<'de> Deserialize<'de> for DeribitLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let items = Vec::<StringOrNumber>::deserialize(deserializer)?;
        let level = match <[StringOrNumber; 2]>::try_from(items) {
            Ok([price, amount]) => RawLevel::new(price.into_text(), amount.into_text()),
            Err(items) => match <[StringOrNumber; 3]>::try_from(items) {
                Ok([action, price, amount]) => {
                    let size = match action.into_text().as_str() {
                        "delete" => "0".to_string(),
                        _ => amount.into_text(),
                    };
                    RawLevel::new(price.into_text(), size)
                }
                Err(items) => {
                    return Err(D::Error::custom(format!(
                        "expected 2 or 3 level fields, got {}",
                        items.len()
                    )))
                }
            },
        };
        Ok(Self(level))
    }
}

/// Adapter for one Deribit instrument
#[derive(Debug, Clone)]
pub struct DeribitAdapter {
    instrument: String,
    channel: String,
    endpoint: Endpoint,
    options: DeribitOptions,
}

impl DeribitAdapter {
    pub fn new(instrument: impl Into<String>, endpoint: Endpoint, options: DeribitOptions) -> Self {
        let instrument = instrument.into();
        let channel = match options.grouped_depth {
            Some(depth) => format!("book.{}.none.{}.{}", instrument, depth, options.interval),
            None => format!("book.{}.{}", instrument, options.interval),
        };
        Self {
            instrument,
            channel,
            endpoint,
            options,
        }
    }

    /// Channel subscribed to
    pub fn channel(&self) -> &str {
        &self.channel
    }

    fn request(&self, method: &str) -> String {
        json!({
            "jsonrpc": "2.0",
            "method": method,
            "id": SUBSCRIPTION_REQUEST_ID,
            "params": { "channels": [self.channel] },
        })
        .to_string()
    }

    fn decode_book(&self, data: DeribitBookData) -> BookFrame {
        let is_snapshot = match self.options.update_mode {
            UpdateMode::Flagged => data.kind.as_deref() == Some("snapshot"),
            UpdateMode::AlwaysIncremental => false,
            UpdateMode::AlwaysSnapshot => true,
        };

        let bids = data.bids.into_iter().map(|l| l.0).collect();
        let asks = data.asks.into_iter().map(|l| l.0).collect();
        let frame = if is_snapshot {
            BookFrame::snapshot(bids, asks)
        } else {
            BookFrame::delta(bids, asks)
        };

        match data.change_id {
            Some(change_id) => frame.with_sequence(SequenceInfo::new(change_id, data.prev_change_id)),
            None => frame,
        }
    }
}

impl VenueAdapter for DeribitAdapter {
    fn venue(&self) -> Venue {
        Venue::Deribit
    }

    fn endpoint(&self) -> Endpoint {
        self.endpoint.clone()
    }

    fn instrument(&self) -> &str {
        &self.instrument
    }

    fn subscribe_message(&self) -> String {
        self.request("public/subscribe")
    }

    fn unsubscribe_message(&self) -> String {
        self.request("public/unsubscribe")
    }

    fn decode(&self, frame: &str) -> FeedResult<Option<BookFrame>> {
        let message: DeribitMessage =
            serde_json::from_str(frame).map_err(|e| FeedError::parse(Venue::Deribit, e))?;

        match message {
            DeribitMessage::Notification(notification) => {
                if notification.params.channel != self.channel {
                    return Ok(None);
                }
                Ok(Some(self.decode_book(notification.params.data)))
            }
            DeribitMessage::Response(response) if response.id == SUBSCRIPTION_REQUEST_ID => {
                match response.error {
                    Some(error) => Err(FeedError::Venue {
                        venue: Venue::Deribit,
                        code: Some(error.code.to_string()),
                        message: format!("subscription failed: {}", error.message),
                    }),
                    None => {
                        debug!(channel = %self.channel, "Deribit subscription acknowledged");
                        Ok(None)
                    }
                }
            }
            DeribitMessage::Response(_) => Ok(None),
            DeribitMessage::Other(other) => match other.method.as_deref() {
                Some("subscription") => Err(FeedError::parse(
                    Venue::Deribit,
                    "malformed book notification",
                )),
                _ => Ok(None),
            },
        }
    }
}
