//! Flat row mapping for spreadsheet/CSV import and export
//!
//! Parsing the file format itself is the caller's job; this module only maps
//! between a flat row of strings and a [`Product`]. Import is lenient: only a
//! missing `id`, `name` or primary part name drops the row. Every other
//! malformed field falls back through [`crate::model::fallback`].

use serde::{Deserialize, Serialize};

use crate::model::fallback::{
    category_or_default, price_or_default, release_date_or_default, source_or_default,
    status_or_default, tier_or_default,
};
use crate::model::{Part, PartSlots, Product, ProductBuilder, Slot};

/// One product flattened into string columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabularRow {
    pub id: String,
    pub name: String,
    pub primary_name: String,
    pub primary_type: String,
    pub secondary_name: String,
    pub secondary_type: String,
    pub tertiary_name: String,
    pub tertiary_type: String,
    pub price: String,
    pub tier: String,
    pub format: String,
    pub set_name: String,
    pub release_date: String,
    pub status: String,
    /// Extra column; blank means a user-authored row
    pub source: String,
}

impl TabularRow {
    /// Column headers in export order
    pub const HEADERS: [&'static str; 15] = [
        "id",
        "name",
        "primary_name",
        "primary_type",
        "secondary_name",
        "secondary_type",
        "tertiary_name",
        "tertiary_type",
        "price",
        "tier",
        "format",
        "set_name",
        "release_date",
        "status",
        "source",
    ];

    fn slot_columns(&self, slot: Slot) -> (&str, &str) {
        match slot {
            Slot::Primary => (self.primary_name.as_str(), self.primary_type.as_str()),
            Slot::Secondary => (self.secondary_name.as_str(), self.secondary_type.as_str()),
            Slot::Tertiary => (self.tertiary_name.as_str(), self.tertiary_type.as_str()),
        }
    }

    /// Values in [`Self::HEADERS`] order
    pub fn values(&self) -> [&str; 15] {
        [
            self.id.as_str(),
            self.name.as_str(),
            self.primary_name.as_str(),
            self.primary_type.as_str(),
            self.secondary_name.as_str(),
            self.secondary_type.as_str(),
            self.tertiary_name.as_str(),
            self.tertiary_type.as_str(),
            self.price.as_str(),
            self.tier.as_str(),
            self.format.as_str(),
            self.set_name.as_str(),
            self.release_date.as_str(),
            self.status.as_str(),
            self.source.as_str(),
        ]
    }
}

/// Map a row to a product, or `None` when `id`, `name` or the primary part
/// name is blank
pub fn row_to_product(row: &TabularRow) -> Option<Product> {
    let id = row.id.trim();
    let name = row.name.trim();
    if id.is_empty() || name.is_empty() || row.primary_name.trim().is_empty() {
        return None;
    }

    let part = |slot: Slot| {
        let (part_name, category) = row.slot_columns(slot);
        Part::new(part_name.trim(), category_or_default(category))
    };
    let parts = PartSlots::new(part(Slot::Primary), part(Slot::Secondary), part(Slot::Tertiary));

    let set_name = Some(row.set_name.trim().to_string());

    Some(
        ProductBuilder::new(id, name, parts)
            .price(price_or_default(&row.price))
            .tier(tier_or_default(&row.tier))
            .format(row.format.trim())
            .set_name(set_name)
            .release_date(release_date_or_default(&row.release_date))
            .status(status_or_default(&row.status))
            .source(source_or_default(&row.source))
            .build(),
    )
}

/// Flatten a product into a row
pub fn product_to_row(product: &Product) -> TabularRow {
    let parts = product.parts();
    TabularRow {
        id: product.id().to_string(),
        name: product.name().to_string(),
        primary_name: parts.primary.name.clone(),
        primary_type: parts.primary.category.to_string(),
        secondary_name: parts.secondary.name.clone(),
        secondary_type: parts.secondary.category.to_string(),
        tertiary_name: parts.tertiary.name.clone(),
        tertiary_type: parts.tertiary.category.to_string(),
        price: product.price().to_string(),
        tier: product.tier().to_string(),
        format: product.format().to_string(),
        set_name: product.set_name().unwrap_or_default().to_string(),
        release_date: product.release_date().to_string(),
        status: product.status().as_str().to_string(),
        source: product.source().as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, PriceRange, ProductSource, ProductStatus, Tier, YearMonth};
    use pretty_assertions::assert_eq;

    fn full_product() -> Product {
        let parts = PartSlots::new(
            Part::new("Dran Dagger", Category::Attack),
            Part::new("4-60", Category::Balance),
            Part::new("Rush", Category::Attack),
        );
        Product::builder("BX-20", "Dran Dagger 4-60R", parts)
            .price(PriceRange::new(1980, 2200).unwrap())
            .tier(Tier::S)
            .format("Deck Set")
            .set_name(Some("Dran Dagger Deck Set".to_string()))
            .release_date(YearMonth::new(2023, 12).unwrap())
            .status(ProductStatus::Upcoming)
            .source(ProductSource::Official)
            .build()
    }

    #[test]
    fn test_full_product_survives_row_mapping() {
        let product = full_product();
        let row = product_to_row(&product);

        assert_eq!(row.price, "1980-2200¥");
        assert_eq!(row.secondary_type, "Balance");
        assert_eq!(row_to_product(&row), Some(product));
    }

    #[test]
    fn test_missing_required_columns_drop_the_row() {
        let base = product_to_row(&full_product());

        let mut no_id = base.clone();
        no_id.id = "  ".to_string();
        assert_eq!(row_to_product(&no_id), None);

        let mut no_name = base.clone();
        no_name.name.clear();
        assert_eq!(row_to_product(&no_name), None);

        let mut no_primary = base;
        no_primary.primary_name.clear();
        assert_eq!(row_to_product(&no_primary), None);
    }

    #[test]
    fn test_malformed_optional_fields_fall_back() {
        let row = TabularRow {
            id: "BX-99".to_string(),
            name: "Mystery".to_string(),
            primary_name: "Mystery Blade".to_string(),
            primary_type: "Speed".to_string(),
            price: "call for price".to_string(),
            tier: "SSS".to_string(),
            release_date: "someday".to_string(),
            ..Default::default()
        };

        let product = row_to_product(&row).unwrap();
        assert_eq!(product.tier(), Tier::A);
        assert_eq!(product.part(Slot::Primary).category, Category::Balance);
        assert_eq!(product.price(), PriceRange::ZERO);
        assert_eq!(product.release_date(), YearMonth::PLACEHOLDER);
        assert_eq!(product.status(), ProductStatus::Active);
        assert_eq!(product.source(), ProductSource::Custom);
        assert_eq!(product.set_name(), None);
        assert_eq!(product.part(Slot::Secondary).name, "");
    }

    #[test]
    fn test_headers_match_values() {
        let row = product_to_row(&full_product());
        assert_eq!(TabularRow::HEADERS.len(), row.values().len());
        assert_eq!(row.values()[0], "BX-20");
        assert_eq!(row.values()[14], "official");
    }
}
