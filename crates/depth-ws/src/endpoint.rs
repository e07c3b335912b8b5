//! WebSocket endpoint definitions

use depth_types::Venue;
use std::fmt;

/// Public WebSocket endpoints of the supported venues
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// OKX v5 public channels
    OkxPublic,
    /// Bybit v5 public spot streams
    BybitSpot,
    /// Deribit production JSON-RPC
    Deribit,
    /// Deribit test environment
    DeribitTestnet,
    /// Any other URL (proxies, local replay servers)
    Custom(String),
}

impl Endpoint {
    /// Get the WebSocket URL for this endpoint
    pub fn url(&self) -> &str {
        match self {
            Self::OkxPublic => "wss://ws.okx.com:8443/ws/v5/public",
            Self::BybitSpot => "wss://stream.bybit.com/v5/public/spot",
            Self::Deribit => "wss://www.deribit.com/ws/api/v2",
            Self::DeribitTestnet => "wss://test.deribit.com/ws/api/v2",
            Self::Custom(url) => url,
        }
    }

    /// Production endpoint of `venue`
    pub fn for_venue(venue: Venue) -> Self {
        match venue {
            Venue::Okx => Self::OkxPublic,
            Venue::Bybit => Self::BybitSpot,
            Venue::Deribit => Self::Deribit,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        assert_eq!(Endpoint::for_venue(Venue::Okx).url(), "wss://ws.okx.com:8443/ws/v5/public");
        assert_eq!(Endpoint::for_venue(Venue::Bybit).url(), "wss://stream.bybit.com/v5/public/spot");
        assert_eq!(Endpoint::for_venue(Venue::Deribit).url(), "wss://www.deribit.com/ws/api/v2");
    }

    #[test]
    fn test_custom_endpoint() {
        let endpoint = Endpoint::Custom("ws://127.0.0.1:9000".into());
        assert_eq!(endpoint.to_string(), "ws://127.0.0.1:9000");
    }
}
