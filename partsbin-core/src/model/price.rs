//! Price range value type
//!
//! Catalog payloads encode prices as `"<min>-<max>¥"`. This module is the only
//! place that string form is parsed or produced; everything else works with
//! [`PriceRange`] and its [`average`](PriceRange::average).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Currency suffix used by catalog payloads
pub const CURRENCY_SYMBOL: char = '¥';

static PRICE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*-\s*(\d+)\s*¥?\s*$").unwrap());

/// A closed price range in a single currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PriceRange {
    min: u32,
    max: u32,
}

impl PriceRange {
    /// `0-0`, the fallback for unparseable prices
    pub const ZERO: PriceRange = PriceRange { min: 0, max: 0 };

    pub fn new(min: u32, max: u32) -> Result<Self, ParseError> {
        if min > max {
            return Err(ParseError::InvertedPrice(format!("{min}-{max}")));
        }
        Ok(Self { min, max })
    }

    /// A single-price range (`min == max`)
    pub fn fixed(price: u32) -> Self {
        Self {
            min: price,
            max: price,
        }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Canonical cost figure: the midpoint of the range
    pub fn average(&self) -> f64 {
        (f64::from(self.min) + f64::from(self.max)) / 2.0
    }
}

impl FromStr for PriceRange {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = PRICE_PATTERN
            .captures(s)
            .ok_or_else(|| ParseError::Price(s.to_string()))?;

        let min = captures[1]
            .parse::<u32>()
            .map_err(|_| ParseError::Price(s.to_string()))?;
        let max = captures[2]
            .parse::<u32>()
            .map_err(|_| ParseError::Price(s.to_string()))?;

        if min > max {
            return Err(ParseError::InvertedPrice(s.to_string()));
        }

        Ok(Self { min, max })
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}{}", self.min, self.max, CURRENCY_SYMBOL)
    }
}

impl Serialize for PriceRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PriceRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_currency() {
        let with = "1980-2200¥".parse::<PriceRange>().unwrap();
        let without = "1980-2200".parse::<PriceRange>().unwrap();

        assert_eq!(with, without);
        assert_eq!(with.min(), 1980);
        assert_eq!(with.max(), 2200);
        assert_eq!(with.average(), 2090.0);
    }

    #[test]
    fn test_display_appends_currency() {
        assert_eq!(PriceRange::fixed(1500).to_string(), "1500-1500¥");
        assert_eq!(PriceRange::ZERO.to_string(), "0-0¥");
    }

    #[test]
    fn test_rejects_malformed_and_inverted() {
        assert!(matches!(
            "cheap".parse::<PriceRange>(),
            Err(ParseError::Price(_))
        ));
        assert!(matches!(
            "20-10¥".parse::<PriceRange>(),
            Err(ParseError::InvertedPrice(_))
        ));
        assert!(PriceRange::new(5, 1).is_err());
    }

    #[test]
    fn test_serde_uses_string_form() {
        let price = PriceRange::new(10, 30).unwrap();
        let json = serde_json::to_value(price).unwrap();
        assert_eq!(json, serde_json::json!("10-30¥"));

        let back: PriceRange = serde_json::from_value(json).unwrap();
        assert_eq!(back, price);
    }
}
