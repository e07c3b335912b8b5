//! Supported venues

use crate::error::FeedError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exchange whose public order book feed can back a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    /// OKX public books channel
    #[serde(rename = "OKX")]
    Okx,
    /// Bybit spot orderbook topic
    #[serde(rename = "ByBit")]
    Bybit,
    /// Deribit perpetual book channel
    #[serde(rename = "Deribit")]
    Deribit,
}

impl Venue {
    /// Every venue the engine knows how to decode
    pub const ALL: [Venue; 3] = [Venue::Okx, Venue::Bybit, Venue::Deribit];

    /// Display name, as shown to the user
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Okx => "OKX",
            Self::Bybit => "ByBit",
            Self::Deribit => "Deribit",
        }
    }
}

impl FromStr for Venue {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "okx" => Ok(Self::Okx),
            "bybit" => Ok(Self::Bybit),
            "deribit" => Ok(Self::Deribit),
            _ => Err(FeedError::UnsupportedVenue {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
