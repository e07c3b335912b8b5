//! Error types for the order book engine

use crate::venue::Venue;
use thiserror::Error;

/// Errors raised while resolving, decoding or reconciling a venue feed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    // === Selection Errors ===
    /// The venue does not list the requested pair
    #[error("{venue} does not support symbol {symbol}")]
    UnsupportedPair { venue: Venue, symbol: String },

    /// Venue name did not match any known venue
    #[error("Unsupported venue: {name}")]
    UnsupportedVenue { name: String },

    // === Transport Errors ===
    /// Socket failed to connect, send or receive
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Socket closed underneath an active session
    #[error("Connection closed")]
    ConnectionClosed,

    // === Protocol Errors ===
    /// Frame text could not be decoded
    #[error("Failed to parse {venue} message: {message}")]
    Parse { venue: Venue, message: String },

    /// Venue answered with an explicit error payload
    #[error("{venue} error{}: {message}", code.as_ref().map(|c| format!(" {c}")).unwrap_or_default())]
    Venue {
        venue: Venue,
        code: Option<String>,
        message: String,
    },

    // === Integrity Errors ===
    /// A delta did not follow the previously applied sequence
    #[error("{venue} sequence gap: expected {expected}, received {received}")]
    SequenceGap {
        venue: Venue,
        expected: i64,
        received: i64,
    },

    /// Book checksum after applying a frame did not match the venue's
    #[error("{venue} checksum mismatch: expected {expected}, computed {computed}")]
    ChecksumMismatch {
        venue: Venue,
        expected: i32,
        computed: i32,
    },
}

impl FeedError {
    /// Shorthand for [`FeedError::UnsupportedPair`]
    pub fn unsupported_pair(venue: Venue, symbol: impl Into<String>) -> Self {
        Self::UnsupportedPair {
            venue,
            symbol: symbol.into(),
        }
    }

    /// Shorthand for [`FeedError::Parse`]
    pub fn parse(venue: Venue, message: impl ToString) -> Self {
        Self::Parse {
            venue,
            message: message.to_string(),
        }
    }

    /// Shorthand for [`FeedError::Transport`]
    pub fn transport(message: impl ToString) -> Self {
        Self::Transport {
            message: message.to_string(),
        }
    }

    /// Returns true if retrying the same selection can never succeed
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedPair { .. } | Self::UnsupportedVenue { .. }
        )
    }

    /// Returns true if the local book no longer mirrors the venue and the
    /// subscription has to be restarted to get a fresh snapshot
    pub fn requires_resync(&self) -> bool {
        matches!(
            self,
            Self::SequenceGap { .. } | Self::ChecksumMismatch { .. }
        )
    }

    /// Returns true if the error came from the socket rather than its content
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::ConnectionClosed)
    }
}

/// Result type alias for feed operations
pub type FeedResult<T> = Result<T, FeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let gap = FeedError::SequenceGap {
            venue: Venue::Okx,
            expected: 10,
            received: 12,
        };
        assert!(gap.requires_resync());
        assert!(!gap.is_fatal());

        assert!(FeedError::unsupported_pair(Venue::Deribit, "SOL-USD").is_fatal());
        assert!(FeedError::ConnectionClosed.is_transport());
        assert!(!FeedError::parse(Venue::Bybit, "bad").is_transport());
    }

    #[test]
    fn test_venue_error_display() {
        let err = FeedError::Venue {
            venue: Venue::Okx,
            code: Some("60018".into()),
            message: "Wrong URL or channel".into(),
        };
        assert_eq!(err.to_string(), "OKX error 60018: Wrong URL or channel");

        let err = FeedError::Venue {
            venue: Venue::Bybit,
            code: None,
            message: "invalid topic".into(),
        };
        assert_eq!(err.to_string(), "ByBit error: invalid topic");
    }
}
