//! Product catalog - ingestion payload, loaded view, and cache
//!
//! # Overview
//!
//! ```text
//! built-in catalog (data/builtin_catalog.json)
//!     │
//!     ├── merged with the user's layer (storage key "catalog")
//!     │
//!     ▼
//! CatalogCache ── validate ──▶ SchemaValidator
//!     │
//!     ▼
//! Catalog   ← purchasable products (tier, then name) + retired products
//! ```
//!
//! The cache is the single source of truth for which products exist. Every
//! mutation goes through it and invalidates it before returning.

mod cache;

pub use cache::{CatalogCache, ImportSummary, DEFAULT_CACHE_TTL};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

use crate::error::CatalogError;
use crate::model::{Product, Tier};
use crate::validator::SchemaValidator;

const BUILTIN_CATALOG: &str = include_str!("../../data/builtin_catalog.json");

/// Catalog metadata block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMetadata {
    /// Catalog version (`major.minor[.patch]`)
    pub version: String,

    /// When the catalog was last changed (ISO date)
    pub last_update: String,

    /// Informational product count
    pub total_products: u64,

    #[serde(default)]
    pub description: String,

    /// Known packaging formats
    #[serde(default)]
    pub formats: Vec<String>,

    /// Tier scale used by this catalog
    #[serde(default)]
    pub tiers: Vec<Tier>,
}

/// Catalog ingestion payload: the unit the validator accepts or rejects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDatabase {
    pub metadata: CatalogMetadata,
    pub products: Vec<Product>,
}

impl CatalogDatabase {
    /// The catalog shipped with the crate
    pub fn builtin() -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(BUILTIN_CATALOG)
            .map_err(|e| CatalogError::Builtin(e.to_string()))?;

        Self::from_value(&value, &SchemaValidator::new()).map_err(|e| match e {
            CatalogError::Rejected { first_error, .. } => CatalogError::Builtin(first_error),
            other => other,
        })
    }

    /// Validate and decode a raw payload. Warnings are accepted; any error rejects.
    pub fn from_value(value: &Value, validator: &SchemaValidator) -> Result<Self, CatalogError> {
        let report = validator.validate_database(value)?;
        if !report.is_acceptable() {
            return Err(CatalogError::rejected(report));
        }

        serde_json::from_value(value.clone()).map_err(CatalogError::Decode)
    }

    pub fn to_value(&self) -> Result<Value, CatalogError> {
        serde_json::to_value(self).map_err(CatalogError::Decode)
    }

    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }
}

/// The loaded, filtered, deterministically ordered view of the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    metadata: CatalogMetadata,
    products: Vec<Product>,
    retired: Vec<Product>,
}

impl Catalog {
    /// Split out discontinued products and order the rest by tier (best
    /// first), then name, then id.
    pub fn from_database(db: CatalogDatabase) -> Self {
        let (retired, mut products): (Vec<_>, Vec<_>) =
            db.products.into_iter().partition(Product::is_discontinued);

        products.sort_by(default_order);

        Self {
            metadata: db.metadata,
            products,
            retired,
        }
    }

    pub fn metadata(&self) -> &CatalogMetadata {
        &self.metadata
    }

    /// Products eligible for recommendation, in default order
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Discontinued products, kept so historical ownership still resolves
    pub fn retired(&self) -> &[Product] {
        &self.retired
    }

    /// Look up any known product, discontinued ones included
    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products
            .iter()
            .chain(self.retired.iter())
            .find(|p| p.id() == id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

fn default_order(a: &Product, b: &Product) -> Ordering {
    a.tier()
        .cmp(&b.tier())
        .then_with(|| a.name().cmp(b.name()))
        .then_with(|| a.id().cmp(b.id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Part, PartSlots, ProductStatus};

    fn product(id: &str, name: &str, tier: Tier, status: ProductStatus) -> Product {
        let parts = PartSlots::new(
            Part::new(format!("{name} P"), Category::Attack),
            Part::new("3-60", Category::Balance),
            Part::new("Flat", Category::Attack),
        );
        Product::builder(id, name, parts)
            .tier(tier)
            .status(status)
            .build()
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let db = CatalogDatabase::builtin().unwrap();
        assert_eq!(db.metadata.total_products as usize, db.products.len());
        assert!(db.contains("BX-01"));
    }

    #[test]
    fn test_catalog_orders_by_tier_then_name_and_retires_discontinued() {
        let db = CatalogDatabase {
            metadata: CatalogDatabase::builtin().unwrap().metadata,
            products: vec![
                product("BX-03", "Zeta", Tier::A, ProductStatus::Active),
                product("BX-02", "Alpha", Tier::A, ProductStatus::Upcoming),
                product("BX-01", "Mid", Tier::SPlus, ProductStatus::Active),
                product("BX-04", "Gone", Tier::SPlus, ProductStatus::Discontinued),
            ],
        };

        let catalog = Catalog::from_database(db);
        let ids: Vec<_> = catalog.products().iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["BX-01", "BX-02", "BX-03"]);
        assert_eq!(catalog.retired().len(), 1);
        assert!(catalog.find("BX-04").is_some());
        assert_eq!(catalog.len(), 3);
    }
}
