//! Fallback policy for lenient imports
//!
//! Tabular imports never reject a row for a malformed optional field. Each
//! function here names the value substituted when the input does not parse.

use tracing::debug;

use super::{Category, PriceRange, ProductSource, ProductStatus, Tier, YearMonth};

pub const DEFAULT_TIER: Tier = Tier::A;
pub const DEFAULT_CATEGORY: Category = Category::Balance;
pub const DEFAULT_STATUS: ProductStatus = ProductStatus::Active;
pub const DEFAULT_SOURCE: ProductSource = ProductSource::Custom;

/// Unrecognized tier → `A`
pub fn tier_or_default(raw: &str) -> Tier {
    raw.parse().unwrap_or_else(|_| {
        debug!("Unrecognized tier '{}', using {}", raw, DEFAULT_TIER);
        DEFAULT_TIER
    })
}

/// Unrecognized category → `Balance`
pub fn category_or_default(raw: &str) -> Category {
    raw.parse().unwrap_or_else(|_| {
        debug!("Unrecognized category '{}', using {}", raw, DEFAULT_CATEGORY);
        DEFAULT_CATEGORY
    })
}

/// Malformed price → `0-0`
pub fn price_or_default(raw: &str) -> PriceRange {
    raw.parse().unwrap_or_else(|_| {
        debug!("Malformed price '{}', using {}", raw, PriceRange::ZERO);
        PriceRange::ZERO
    })
}

/// Malformed release date → the placeholder month
pub fn release_date_or_default(raw: &str) -> YearMonth {
    raw.parse().unwrap_or_else(|_| {
        debug!(
            "Malformed release date '{}', using {}",
            raw,
            YearMonth::PLACEHOLDER
        );
        YearMonth::PLACEHOLDER
    })
}

/// Unrecognized status → `active`
pub fn status_or_default(raw: &str) -> ProductStatus {
    raw.parse().unwrap_or(DEFAULT_STATUS)
}

/// Blank or unrecognized source → `custom`
pub fn source_or_default(raw: &str) -> ProductSource {
    raw.parse().unwrap_or(DEFAULT_SOURCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallbacks_apply_only_to_unparseable_input() {
        assert_eq!(tier_or_default("S+"), Tier::SPlus);
        assert_eq!(tier_or_default("legendary"), Tier::A);

        assert_eq!(category_or_default("defense"), Category::Defense);
        assert_eq!(category_or_default(""), Category::Balance);

        assert_eq!(price_or_default("100-200"), PriceRange::new(100, 200).unwrap());
        assert_eq!(price_or_default("about 200"), PriceRange::ZERO);

        assert_eq!(release_date_or_default("2024-03").to_string(), "2024-03");
        assert_eq!(release_date_or_default("soon"), YearMonth::PLACEHOLDER);

        assert_eq!(status_or_default("upcoming"), ProductStatus::Upcoming);
        assert_eq!(status_or_default("???"), ProductStatus::Active);

        assert_eq!(source_or_default("official"), ProductSource::Official);
        assert_eq!(source_or_default(""), ProductSource::Custom);
    }
}
