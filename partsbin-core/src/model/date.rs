//! Year-month value type for release dates (`YYYY-MM`)

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

static YEAR_MONTH_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})$").unwrap());

/// A calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: u16,
    month: u8,
}

impl YearMonth {
    /// Placeholder month substituted for malformed release dates
    pub const PLACEHOLDER: YearMonth = YearMonth {
        year: 2000,
        month: 1,
    };

    pub fn new(year: u16, month: u8) -> Result<Self, ParseError> {
        if !(1..=12).contains(&month) {
            return Err(ParseError::YearMonth(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }
}

impl FromStr for YearMonth {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = YEAR_MONTH_PATTERN
            .captures(s.trim())
            .ok_or_else(|| ParseError::YearMonth(s.to_string()))?;

        let year = captures[1]
            .parse::<u16>()
            .map_err(|_| ParseError::YearMonth(s.to_string()))?;
        let month = captures[2]
            .parse::<u8>()
            .map_err(|_| ParseError::YearMonth(s.to_string()))?;

        Self::new(year, month).map_err(|_| ParseError::YearMonth(s.to_string()))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let ym: YearMonth = "2023-07".parse().unwrap();
        assert_eq!(ym.year(), 2023);
        assert_eq!(ym.month(), 7);
        assert_eq!(ym.to_string(), "2023-07");
    }

    #[test]
    fn test_rejects_bad_months_and_shapes() {
        assert!("2023-13".parse::<YearMonth>().is_err());
        assert!("2023-00".parse::<YearMonth>().is_err());
        assert!("2023-7".parse::<YearMonth>().is_err());
        assert!("July 2023".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_chronological_order() {
        let earlier: YearMonth = "2023-12".parse().unwrap();
        let later: YearMonth = "2024-01".parse().unwrap();
        assert!(earlier < later);
    }
}
