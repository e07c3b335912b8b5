//! OKX v5 `books` channel
//!
//! Snapshot and update pushes carry both sides in `data[0]`, together with
//! `seqId`/`prevSeqId` and a CRC32 checksum of the resulting book.

use crate::adapter::VenueAdapter;
use crate::endpoint::Endpoint;
use depth_types::{BookFrame, FeedError, FeedResult, RawLevel, SequenceInfo, Venue};
use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

/// Full-depth incremental book channel
pub const OKX_BOOK_CHANNEL: &str = "books";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OkxMessage {
    Book(OkxBookPush),
    Event(OkxEvent),
    Other(OkxOther),
}

#[derive(Debug, Deserialize)]
struct OkxBookPush {
    arg: OkxArg,
    action: Option<OkxAction>,
    data: Vec<OkxBookData>,
}

#[derive(Debug, Deserialize)]
struct OkxArg {
    channel: String,
    #[serde(rename = "instId")]
    inst_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum OkxAction {
    Snapshot,
    Update,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OkxBookData {
    #[serde(default)]
    asks: Vec<RawLevel>,
    #[serde(default)]
    bids: Vec<RawLevel>,
    checksum: Option<i32>,
    seq_id: Option<i64>,
    prev_seq_id: Option<i64>,
}

/// Any other envelope; only used to spot broken book pushes
#[derive(Debug, Deserialize)]
struct OkxOther {
    arg: Option<OkxOtherArg>,
    data: Option<IgnoredAny>,
}

#[derive(Debug, Deserialize)]
struct OkxOtherArg {
    channel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OkxEvent {
    event: String,
    code: Option<String>,
    msg: Option<String>,
}

/// Adapter for one OKX instrument
#[derive(Debug, Clone)]
pub struct OkxAdapter {
    inst_id: String,
    endpoint: Endpoint,
}

impl OkxAdapter {
    pub fn new(inst_id: impl Into<String>, endpoint: Endpoint) -> Self {
        Self {
            inst_id: inst_id.into(),
            endpoint,
        }
    }

    fn request(&self, op: &str) -> String {
        json!({
            "op": op,
            "args": [{"channel": OKX_BOOK_CHANNEL, "instId": self.inst_id}],
        })
        .to_string()
    }

    fn decode_book(&self, push: OkxBookPush) -> FeedResult<Option<BookFrame>> {
        if push.arg.channel != OKX_BOOK_CHANNEL || push.arg.inst_id != self.inst_id {
            return Ok(None);
        }
        let Some(data) = push.data.into_iter().next() else {
            return Ok(None);
        };

        let mut frame = if push.action == Some(OkxAction::Snapshot) {
            BookFrame::snapshot(data.bids, data.asks)
        } else {
            BookFrame::delta(data.bids, data.asks)
        };
        if let Some(seq_id) = data.seq_id {
            // -1 marks a snapshot that follows nothing
            let previous = data.prev_seq_id.filter(|p| *p >= 0);
            frame = frame.with_sequence(SequenceInfo::new(seq_id, previous));
        }
        if let Some(checksum) = data.checksum {
            frame = frame.with_checksum(checksum);
        }
        Ok(Some(frame))
    }

    fn decode_event(&self, event: OkxEvent) -> FeedResult<Option<BookFrame>> {
        match event.event.as_str() {
            "error" => Err(FeedError::Venue {
                venue: Venue::Okx,
                code: event.code,
                message: event.msg.unwrap_or_default(),
            }),
            "subscribe" | "unsubscribe" => {
                debug!(event = %event.event, inst_id = %self.inst_id, "OKX subscription acknowledged");
                Ok(None)
            }
            "notice" => {
                info!(code = ?event.code, msg = ?event.msg, "OKX notice");
                Ok(None)
            }
            other => {
                debug!(event = other, "Ignoring OKX event");
                Ok(None)
            }
        }
    }
}

impl VenueAdapter for OkxAdapter {
    fn venue(&self) -> Venue {
        Venue::Okx
    }

    fn endpoint(&self) -> Endpoint {
        self.endpoint.clone()
    }

    fn instrument(&self) -> &str {
        &self.inst_id
    }

    fn subscribe_message(&self) -> String {
        self.request("subscribe")
    }

    fn unsubscribe_message(&self) -> String {
        self.request("unsubscribe")
    }

    fn decode(&self, frame: &str) -> FeedResult<Option<BookFrame>> {
        if frame == "pong" {
            return Ok(None);
        }
        let message: OkxMessage =
            serde_json::from_str(frame).map_err(|e| FeedError::parse(Venue::Okx, e))?;

        match message {
            OkxMessage::Book(push) => self.decode_book(push),
            OkxMessage::Event(event) => self.decode_event(event),
            OkxMessage::Other(other) => {
                let channel = other.arg.and_then(|arg| arg.channel);
                if channel.as_deref() == Some(OKX_BOOK_CHANNEL) && other.data.is_some() {
                    return Err(FeedError::parse(Venue::Okx, "malformed book push"));
                }
                debug!(channel = ?channel, "Ignoring OKX message");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> OkxAdapter {
        OkxAdapter::new("BTC-USDT", Endpoint::OkxPublic)
    }

    #[test]
    fn test_subscribe_message() {
        let value: serde_json::Value = serde_json::from_str(&adapter().subscribe_message()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"op": "subscribe", "args": [{"channel": "books", "instId": "BTC-USDT"}]})
        );
        let value: serde_json::Value = serde_json::from_str(&adapter().unsubscribe_message()).unwrap();
        assert_eq!(value["op"], "unsubscribe");
    }

    #[test]
    fn test_decode_snapshot() {
        let frame = r#"{"arg":{"channel":"books","instId":"BTC-USDT"},"action":"snapshot","data":[{"asks":[["8476.98","415","0","13"],["8477","7","0","2"]],"bids":[["8476.97","256","0","12"]],"ts":"1597026383085","checksum":-855196043,"prevSeqId":-1,"seqId":123456}]}"#;
        let decoded = adapter().decode(frame).unwrap().unwrap();

        assert!(decoded.is_snapshot);
        assert_eq!(decoded.asks.len(), 2);
        assert_eq!(decoded.bids[0], RawLevel::new("8476.97", "256"));
        assert_eq!(decoded.sequence, Some(SequenceInfo::new(123456, None)));
        assert_eq!(decoded.checksum, Some(-855196043));
    }

    #[test]
    fn test_decode_update() {
        let frame = r#"{"arg":{"channel":"books","instId":"BTC-USDT"},"action":"update","data":[{"asks":[["8476.98","0","0","0"]],"bids":[],"ts":"1597026383086","checksum":12345,"prevSeqId":123456,"seqId":123457}]}"#;
        let decoded = adapter().decode(frame).unwrap().unwrap();

        assert!(!decoded.is_snapshot);
        assert!(decoded.bids.is_empty());
        assert_eq!(decoded.sequence, Some(SequenceInfo::new(123457, Some(123456))));
    }

    #[test]
    fn test_acks_and_pong_are_not_book_data() {
        let adapter = adapter();
        assert_eq!(adapter.decode("pong").unwrap(), None);
        assert_eq!(
            adapter
                .decode(r#"{"event":"subscribe","arg":{"channel":"books","instId":"BTC-USDT"},"connId":"a4d3ae55"}"#)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_other_instrument_ignored() {
        let frame = r#"{"arg":{"channel":"books","instId":"ETH-USDT"},"action":"snapshot","data":[{"asks":[],"bids":[]}]}"#;
        assert_eq!(adapter().decode(frame).unwrap(), None);
    }

    #[test]
    fn test_error_event() {
        let err = adapter()
            .decode(r#"{"event":"error","code":"60018","msg":"Wrong URL or channel:books,instId:FOO doesn't exist.","connId":"a4d3ae55"}"#)
            .unwrap_err();
        assert!(matches!(err, FeedError::Venue { venue: Venue::Okx, code: Some(ref c), .. } if c == "60018"));
    }

    #[test]
    fn test_malformed_frame() {
        let err = adapter().decode("{not json").unwrap_err();
        assert!(matches!(err, FeedError::Parse { venue: Venue::Okx, .. }));

        let broken = r#"{"arg":{"channel":"books","instId":"BTC-USDT"},"action":"snapshot","data":[{"bids":[["8476.97"]]}]}"#;
        let err = adapter().decode(broken).unwrap_err();
        assert!(matches!(err, FeedError::Parse { venue: Venue::Okx, .. }));
    }

    #[test]
    fn test_unknown_envelopes_ignored() {
        let adapter = adapter();
        assert_eq!(adapter.decode(r#"{"id":"1","op":"order","code":"0"}"#).unwrap(), None);
        assert_eq!(
            adapter
                .decode(r#"{"arg":{"channel":"tickers","instId":"BTC-USDT"},"data":[{"last":"9999.99"}]}"#)
                .unwrap(),
            None
        );
    }
}
