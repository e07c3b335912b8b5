//! CRC32 checksum validation for OKX books
//!
//! # Algorithm
//!
//! 1. Take the top 25 levels of each side
//! 2. Interleave them best-first: `bid_px:bid_sz:ask_px:ask_sz:...`; when one
//!    side runs out the other continues alone
//! 3. Use the price and size text exactly as the venue sent it
//! 4. CRC32 (ISO 3309) of the joined string, read as a signed 32-bit integer

use crate::side::BookLevel;
use crc32fast::Hasher;

/// Levels per side covered by the OKX checksum
pub const OKX_CHECKSUM_DEPTH: usize = 25;

/// Compute the OKX checksum over best-first bid and ask iterators
pub fn okx_checksum<'a>(
    bids: impl Iterator<Item = &'a BookLevel>,
    asks: impl Iterator<Item = &'a BookLevel>,
) -> i32 {
    let payload = checksum_payload(bids, asks);
    let mut hasher = Hasher::new();
    hasher.update(payload.as_bytes());
    hasher.finalize() as i32
}

/// The string the checksum is computed over
pub fn checksum_payload<'a>(
    bids: impl Iterator<Item = &'a BookLevel>,
    asks: impl Iterator<Item = &'a BookLevel>,
) -> String {
    let mut bids = bids.take(OKX_CHECKSUM_DEPTH);
    let mut asks = asks.take(OKX_CHECKSUM_DEPTH);
    let mut parts: Vec<&str> = Vec::with_capacity(OKX_CHECKSUM_DEPTH * 4);

    loop {
        let bid = bids.next();
        let ask = asks.next();
        if bid.is_none() && ask.is_none() {
            break;
        }
        if let Some(bid) = bid {
            parts.push(&bid.price_text);
            parts.push(&bid.size_text);
        }
        if let Some(ask) = ask {
            parts.push(&ask.price_text);
            parts.push(&ask.size_text);
        }
    }

    parts.join(":")
}
