//! Test helpers shared by the integration tests

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use partsbin_core::catalog::{CatalogCache, CatalogDatabase, CatalogMetadata};
use partsbin_core::clock::ManualClock;
use partsbin_core::collection::CollectionStore;
use partsbin_core::model::{Category, Part, PartSlots, PriceRange, Product, Tier};
use partsbin_core::optimizer::PurchaseOptimizer;
use partsbin_core::planner::Planner;
use partsbin_core::storage::{InMemoryStore, KeyValueStore};
use std::sync::{Arc, Once};

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// A manual clock parked at a fixed instant
pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
    ))
}

/// An official product with distinct categories per slot
pub fn official(id: &str, tier: Tier, price: u32, parts: (&str, &str, &str)) -> Product {
    let slots = PartSlots::new(
        Part::new(parts.0, Category::Attack),
        Part::new(parts.1, Category::Balance),
        Part::new(parts.2, Category::Stamina),
    );
    Product::builder(id, format!("{} {}{}", parts.0, parts.1, parts.2), slots)
        .tier(tier)
        .price(PriceRange::fixed(price))
        .format("Booster")
        .build()
}

pub fn database(version: &str, products: Vec<Product>) -> CatalogDatabase {
    CatalogDatabase {
        metadata: CatalogMetadata {
            version: version.to_string(),
            last_update: "2024-06-01".to_string(),
            total_products: products.len() as u64,
            description: "test catalog".to_string(),
            formats: vec!["Booster".to_string()],
            tiers: Tier::ALL.to_vec(),
        },
        products,
    }
}

pub fn memory_store() -> Arc<dyn KeyValueStore> {
    Arc::new(InMemoryStore::new())
}

/// A planner whose built-in catalog is `builtin`, over the given store and clock
pub fn planner_with(
    store: Arc<dyn KeyValueStore>,
    builtin: CatalogDatabase,
    clock: Arc<ManualClock>,
) -> Planner {
    let catalog = CatalogCache::new(Arc::clone(&store), builtin).with_clock(clock.clone());
    let collection = CollectionStore::new(store).with_clock(clock);
    Planner::new(catalog, collection, PurchaseOptimizer::default())
}
