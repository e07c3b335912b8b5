//! Price levels as received from a venue

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// A single `(price, size)` pair exactly as the venue sent it
///
/// Venues disagree on whether numbers travel as JSON strings or JSON numbers,
/// so both are kept as text and only parsed by the book store. A size that
/// does not parse is a removal instruction, never a stored level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawLevel {
    /// Price text, e.g. `"64250.5"`
    pub price: String,
    /// Size text, e.g. `"0.012"`
    pub size: String,
}

impl RawLevel {
    /// Create a new raw level
    pub fn new(price: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            price: price.into(),
            size: size.into(),
        }
    }

    /// Parsed price, `None` if the text is not a decimal number
    pub fn parse_price(&self) -> Option<Decimal> {
        parse_decimal(&self.price)
    }

    /// Parsed size, `None` if the text is not a decimal number
    pub fn parse_size(&self) -> Option<Decimal> {
        parse_decimal(&self.size)
    }
}

/// Parse decimal text, accepting scientific notation (`5e-6`)
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Text of a JSON scalar that may be either a string or a number
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl StringOrNumber {
    /// Textual form, preserving the digits of JSON numbers
    pub fn into_text(self) -> String {
        match self {
            Self::String(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Levels arrive as arrays: `[price, size]` (Bybit, Deribit grouped) or
/// `[price, size, "0", orders]` (OKX). Trailing elements are ignored.
impl<'de> Deserialize<'de> for RawLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let items = Vec::<StringOrNumber>::deserialize(deserializer)?;
        let mut items = items.into_iter();
        let price = items
            .next()
            .ok_or_else(|| D::Error::custom("level is missing a price"))?;
        let size = items
            .next()
            .ok_or_else(|| D::Error::custom("level is missing a size"))?;

        Ok(Self {
            price: price.into_text(),
            size: size.into_text(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_level_from_string_array() {
        let level: RawLevel = serde_json::from_str(r#"["64250.5", "0.012", "0", "3"]"#).unwrap();
        assert_eq!(level, RawLevel::new("64250.5", "0.012"));
    }

    #[test]
    fn test_level_from_number_array() {
        let level: RawLevel = serde_json::from_str("[88813.5, 0.00460208]").unwrap();
        assert_eq!(level.price, "88813.5");
        assert_eq!(level.size, "0.00460208");
        assert_eq!(level.parse_price(), Some(dec!(88813.5)));
    }

    #[test]
    fn test_level_too_short() {
        assert!(serde_json::from_str::<RawLevel>(r#"["100"]"#).is_err());
    }

    #[test]
    fn test_parse_decimal_variants() {
        assert_eq!(parse_decimal("1.50"), Some(dec!(1.50)));
        assert_eq!(parse_decimal("5e-6"), Some(dec!(0.000005)));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
    }
}
