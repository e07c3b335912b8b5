//! Canonical trading pair symbols (BTC-USD format) and venue translation

use crate::error::{FeedError, FeedResult};
use crate::venue::Venue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical trading pair symbol in `BASE-QUOTE` form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// BTC-USD trading pair
    pub const BTC_USD: &'static str = "BTC-USD";
    /// ETH-USD trading pair
    pub const ETH_USD: &'static str = "ETH-USD";
    /// SOL-USD trading pair
    pub const SOL_USD: &'static str = "SOL-USD";

    /// Create a new symbol from a string
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the symbol as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the base currency (e.g., "BTC" from "BTC-USD")
    pub fn base(&self) -> Option<&str> {
        self.0.split('-').next().filter(|s| !s.is_empty())
    }

    /// Get the quote currency (e.g., "USD" from "BTC-USD")
    pub fn quote(&self) -> Option<&str> {
        self.0.split('-').nth(1).filter(|s| !s.is_empty())
    }
}

impl FromStr for Symbol {
    type Err = SymbolParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.contains('-') {
            return Err(SymbolParseError::MissingDash(s.to_string()));
        }

        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 2 {
            return Err(SymbolParseError::InvalidFormat(s.to_string()));
        }

        if parts[0].is_empty() || parts[1].is_empty() {
            return Err(SymbolParseError::EmptyPart(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Error parsing a symbol
#[derive(Debug, Clone, thiserror::Error)]
pub enum SymbolParseError {
    #[error("Symbol must contain '-': {0}")]
    MissingDash(String),

    #[error("Invalid symbol format: {0}")]
    InvalidFormat(String),

    #[error("Symbol has empty base or quote: {0}")]
    EmptyPart(String),
}

/// Maps a canonical symbol to the instrument identifier a venue subscribes with
///
/// Returning `None` means the venue does not list the pair.
pub trait SymbolMapper: Send + Sync {
    /// Venue-native instrument for `symbol`, if the venue supports it
    fn instrument(&self, symbol: &Symbol, venue: Venue) -> Option<String>;

    /// Like [`instrument`](Self::instrument) but surfaces an unsupported pair as an error
    fn resolve(&self, symbol: &Symbol, venue: Venue) -> FeedResult<String> {
        self.instrument(symbol, venue)
            .ok_or_else(|| FeedError::unsupported_pair(venue, symbol.as_str()))
    }
}

/// Instrument naming used by the public feeds of the three venues
///
/// - OKX takes the canonical symbol unchanged
/// - Bybit lists USDT-quoted spot pairs for BTC, ETH and SOL (`BTC-USD` -> `BTCUSDT`)
/// - Deribit only offers the BTC and ETH perpetuals (`BTC-USD` -> `BTC-PERPETUAL`)
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSymbolMapper;

impl DefaultSymbolMapper {
    const BYBIT_BASES: [&'static str; 3] = ["BTC", "ETH", "SOL"];
    const DERIBIT_BASES: [&'static str; 2] = ["BTC", "ETH"];
}

impl SymbolMapper for DefaultSymbolMapper {
    fn instrument(&self, symbol: &Symbol, venue: Venue) -> Option<String> {
        let base = symbol.base()?;
        let quote = symbol.quote()?;

        match venue {
            Venue::Okx => Some(symbol.as_str().to_string()),
            Venue::Bybit => {
                if quote != "USD" || !Self::BYBIT_BASES.contains(&base) {
                    return None;
                }
                Some(format!("{base}USDT"))
            }
            Venue::Deribit => {
                if quote != "USD" || !Self::DERIBIT_BASES.contains(&base) {
                    return None;
                }
                Some(format!("{base}-PERPETUAL"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_parse() {
        let symbol: Symbol = "BTC-USD".parse().unwrap();
        assert_eq!(symbol.as_str(), "BTC-USD");
        assert_eq!(symbol.base(), Some("BTC"));
        assert_eq!(symbol.quote(), Some("USD"));
    }

    #[test]
    fn test_symbol_parse_error() {
        assert!("BTCUSD".parse::<Symbol>().is_err());
        assert!("-USD".parse::<Symbol>().is_err());
        assert!("BTC-".parse::<Symbol>().is_err());
        assert!("BTC-USD-SWAP".parse::<Symbol>().is_err());
    }

    #[test]
    fn test_okx_passthrough() {
        let mapper = DefaultSymbolMapper;
        let symbol = Symbol::new("SOL-USDT");
        assert_eq!(mapper.instrument(&symbol, Venue::Okx).as_deref(), Some("SOL-USDT"));
    }

    #[test]
    fn test_bybit_translation() {
        let mapper = DefaultSymbolMapper;
        assert_eq!(
            mapper.instrument(&Symbol::new("ETH-USD"), Venue::Bybit).as_deref(),
            Some("ETHUSDT")
        );
        assert_eq!(mapper.instrument(&Symbol::new("ETH-EUR"), Venue::Bybit), None);
        assert_eq!(mapper.instrument(&Symbol::new("DOGE-USD"), Venue::Bybit), None);
    }

    #[test]
    fn test_deribit_translation() {
        let mapper = DefaultSymbolMapper;
        assert_eq!(
            mapper.instrument(&Symbol::new("BTC-USD"), Venue::Deribit).as_deref(),
            Some("BTC-PERPETUAL")
        );
        assert_eq!(mapper.instrument(&Symbol::new("SOL-USD"), Venue::Deribit), None);
    }

    #[test]
    fn test_resolve_unsupported_pair() {
        let mapper = DefaultSymbolMapper;
        let err = mapper
            .resolve(&Symbol::new("BTC-EUR"), Venue::Bybit)
            .unwrap_err();
        assert!(matches!(err, FeedError::UnsupportedPair { venue: Venue::Bybit, .. }));
        assert_eq!(err.to_string(), "ByBit does not support symbol BTC-EUR");
    }

    #[test]
    fn test_malformed_symbol_is_unsupported() {
        let mapper = DefaultSymbolMapper;
        assert_eq!(mapper.instrument(&Symbol::new("BTCUSD"), Venue::Okx), None);
    }
}
