//! Product data model
//!
//! A [`Product`] is an acquirable unit bundling exactly three parts, one per
//! [`Slot`]. Its id and parts are fixed at construction; other fields can only
//! change by building a new record through [`ProductBuilder`].

pub mod date;
pub mod fallback;
pub mod price;

pub use date::YearMonth;
pub use price::PriceRange;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ParseError;

/// One of the three fixed component positions every product fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Primary,
    Secondary,
    Tertiary,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Primary, Slot::Secondary, Slot::Tertiary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Primary => "primary",
            Slot::Secondary => "secondary",
            Slot::Tertiary => "tertiary",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification tag on a part. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Attack,
    Defense,
    Stamina,
    Balance,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Attack,
        Category::Defense,
        Category::Stamina,
        Category::Balance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Attack => "Attack",
            Category::Defense => "Defense",
            Category::Stamina => "Stamina",
            Category::Balance => "Balance",
        }
    }
}

impl FromStr for Category {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::UnknownVariant {
                kind: "category",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality ranking of a product. Declaration order is best-to-worst, so
/// `Tier::SPlus < Tier::B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "S+")]
    SPlus,
    S,
    A,
    B,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::SPlus, Tier::S, Tier::A, Tier::B];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::SPlus => "S+",
            Tier::S => "S",
            Tier::A => "A",
            Tier::B => "B",
        }
    }
}

impl FromStr for Tier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::UnknownVariant {
                kind: "tier",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Upcoming,
    /// Excluded from recommendations; still resolves for ownership records
    Discontinued,
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 3] = [
        ProductStatus::Active,
        ProductStatus::Upcoming,
        ProductStatus::Discontinued,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Upcoming => "upcoming",
            ProductStatus::Discontinued => "discontinued",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductStatus::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::UnknownVariant {
                kind: "status",
                value: s.to_string(),
            })
    }
}

/// Where a product record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductSource {
    /// Curated catalog entry
    #[default]
    Official,
    /// User-authored entry; bypasses the official id pattern and `format` requirement
    Custom,
}

impl ProductSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductSource::Official => "official",
            ProductSource::Custom => "custom",
        }
    }
}

impl FromStr for ProductSource {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "official" => Ok(ProductSource::Official),
            "custom" => Ok(ProductSource::Custom),
            _ => Err(ParseError::UnknownVariant {
                kind: "source",
                value: s.to_string(),
            }),
        }
    }
}

/// A single part selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Part {
    pub name: String,
    pub category: Category,
}

impl Part {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }
}

/// The three part selections of a product, one per slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartSlots {
    pub primary: Part,
    pub secondary: Part,
    pub tertiary: Part,
}

impl PartSlots {
    pub fn new(primary: Part, secondary: Part, tertiary: Part) -> Self {
        Self {
            primary,
            secondary,
            tertiary,
        }
    }

    pub fn get(&self, slot: Slot) -> &Part {
        match slot {
            Slot::Primary => &self.primary,
            Slot::Secondary => &self.secondary,
            Slot::Tertiary => &self.tertiary,
        }
    }

    /// `(slot, part)` pairs in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &Part)> {
        Slot::ALL.into_iter().map(move |slot| (slot, self.get(slot)))
    }
}

/// An acquirable unit bundling three parts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: String,
    name: String,
    parts: PartSlots,
    price: PriceRange,
    tier: Tier,
    #[serde(default)]
    format: String,
    #[serde(default)]
    set_name: Option<String>,
    release_date: YearMonth,
    status: ProductStatus,
    #[serde(default)]
    source: ProductSource,
}

impl Product {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parts(&self) -> &PartSlots {
        &self.parts
    }

    pub fn part(&self, slot: Slot) -> &Part {
        self.parts.get(slot)
    }

    pub fn price(&self) -> PriceRange {
        self.price
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn set_name(&self) -> Option<&str> {
        self.set_name.as_deref()
    }

    pub fn release_date(&self) -> YearMonth {
        self.release_date
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn source(&self) -> ProductSource {
        self.source
    }

    pub fn is_discontinued(&self) -> bool {
        self.status == ProductStatus::Discontinued
    }

    /// Start a builder for a new product
    pub fn builder(id: impl Into<String>, name: impl Into<String>, parts: PartSlots) -> ProductBuilder {
        ProductBuilder::new(id, name, parts)
    }

    /// Start a builder that carries every field of this product.
    ///
    /// The id and parts are fixed; the result is a new record.
    pub fn to_builder(&self) -> ProductBuilder {
        ProductBuilder {
            id: self.id.clone(),
            name: self.name.clone(),
            parts: self.parts.clone(),
            price: self.price,
            tier: self.tier,
            format: self.format.clone(),
            set_name: self.set_name.clone(),
            release_date: self.release_date,
            status: self.status,
            source: self.source,
        }
    }
}

/// Explicit, field-by-field construction of [`Product`] records
#[derive(Debug, Clone)]
pub struct ProductBuilder {
    id: String,
    name: String,
    parts: PartSlots,
    price: PriceRange,
    tier: Tier,
    format: String,
    set_name: Option<String>,
    release_date: YearMonth,
    status: ProductStatus,
    source: ProductSource,
}

impl ProductBuilder {
    pub fn new(id: impl Into<String>, name: impl Into<String>, parts: PartSlots) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parts,
            price: PriceRange::ZERO,
            tier: fallback::DEFAULT_TIER,
            format: String::new(),
            set_name: None,
            release_date: YearMonth::PLACEHOLDER,
            status: ProductStatus::Active,
            source: ProductSource::Official,
        }
    }

    /// A user-authored product with a freshly minted `custom-` id
    pub fn custom(name: impl Into<String>, parts: PartSlots) -> Self {
        let id = format!("custom-{}", Uuid::new_v4().simple());
        Self::new(id, name, parts).source(ProductSource::Custom)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn price(mut self, price: PriceRange) -> Self {
        self.price = price;
        self
    }

    pub fn tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn set_name(mut self, set_name: Option<String>) -> Self {
        self.set_name = set_name.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn release_date(mut self, release_date: YearMonth) -> Self {
        self.release_date = release_date;
        self
    }

    pub fn status(mut self, status: ProductStatus) -> Self {
        self.status = status;
        self
    }

    pub fn source(mut self, source: ProductSource) -> Self {
        self.source = source;
        self
    }

    pub fn build(self) -> Product {
        Product {
            id: self.id,
            name: self.name,
            parts: self.parts,
            price: self.price,
            tier: self.tier,
            format: self.format,
            set_name: self.set_name,
            release_date: self.release_date,
            status: self.status,
            source: self.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parts() -> PartSlots {
        PartSlots::new(
            Part::new("Dran Sword", Category::Attack),
            Part::new("3-60", Category::Balance),
            Part::new("Flat", Category::Attack),
        )
    }

    #[test]
    fn test_tier_order_is_best_first() {
        let mut tiers = vec![Tier::B, Tier::SPlus, Tier::A, Tier::S];
        tiers.sort();
        assert_eq!(tiers, vec![Tier::SPlus, Tier::S, Tier::A, Tier::B]);
    }

    #[test]
    fn test_enum_parsing_is_case_insensitive() {
        assert_eq!("s+".parse::<Tier>().unwrap(), Tier::SPlus);
        assert_eq!("stamina".parse::<Category>().unwrap(), Category::Stamina);
        assert_eq!(
            "Discontinued".parse::<ProductStatus>().unwrap(),
            ProductStatus::Discontinued
        );
        assert!("Z".parse::<Tier>().is_err());
    }

    #[test]
    fn test_product_json_shape() {
        let product = Product::builder("BX-01", "Dran Sword 3-60F", parts())
            .price(PriceRange::new(1980, 2200).unwrap())
            .tier(Tier::S)
            .format("Starter")
            .release_date("2023-07".parse().unwrap())
            .build();

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["price"], "1980-2200¥");
        assert_eq!(json["releaseDate"], "2023-07");
        assert_eq!(json["tier"], "S");
        assert_eq!(json["status"], "active");
        assert_eq!(json["parts"]["primary"]["category"], "Attack");

        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn test_to_builder_keeps_identity() {
        let original = Product::builder("BX-01", "Dran Sword 3-60F", parts()).build();
        let retired = original
            .to_builder()
            .status(ProductStatus::Discontinued)
            .build();

        assert_eq!(retired.id(), original.id());
        assert_eq!(retired.parts(), original.parts());
        assert!(retired.is_discontinued());
        assert!(!original.is_discontinued());
    }

    #[test]
    fn test_custom_builder_mints_custom_id() {
        let product = ProductBuilder::custom("My Combo", parts()).build();
        assert!(product.id().starts_with("custom-"));
        assert_eq!(product.source(), ProductSource::Custom);
    }
}
