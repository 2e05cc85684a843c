//! Catalog cache
//!
//! Merges the built-in catalog with the user's persisted layer, filters and
//! orders it, and keeps the result for a 5-minute TTL. Every mutation
//! validates, persists and invalidates before returning, so a read issued
//! right after a write always sees the new state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use super::{Catalog, CatalogDatabase};
use crate::clock::{Clock, SystemClock};
use crate::error::CatalogError;
use crate::model::{Product, ProductSource};
use crate::storage::{KeyValueStore, CATALOG_KEY};
use crate::tabular::{product_to_row, row_to_product, TabularRow};
use crate::validator::{SchemaValidator, ValidationReport};

/// Default cache TTL (5 minutes)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// A loaded catalog and when it was loaded
#[derive(Debug, Clone)]
struct CachedCatalog {
    loaded_at: DateTime<Utc>,
    catalog: Arc<Catalog>,
}

/// Outcome of a tabular import
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    /// Rows added as new products
    pub added: usize,
    /// Rows that replaced an existing product with the same id
    pub replaced: usize,
    /// Rows dropped, with the reason (1-based row numbers)
    pub skipped: Vec<(usize, String)>,
    /// Validation report of the resulting catalog (warnings only)
    pub report: ValidationReport,
}

/// Authoritative, cached view of all products
pub struct CatalogCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    validator: SchemaValidator,
    builtin: CatalogDatabase,
    ttl: Duration,
    cached: Option<CachedCatalog>,
}

impl CatalogCache {
    pub fn new(store: Arc<dyn KeyValueStore>, builtin: CatalogDatabase) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            validator: SchemaValidator::new(),
            builtin,
            ttl: DEFAULT_CACHE_TTL,
            cached: None,
        }
    }

    /// Replace the time source (tests drive TTL expiry with a manual clock)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether a cached catalog exists and is inside the freshness window
    pub fn is_fresh(&self) -> bool {
        self.cached
            .as_ref()
            .map(|cached| self.age_of(cached) < self.ttl)
            .unwrap_or(false)
    }

    fn age_of(&self, cached: &CachedCatalog) -> Duration {
        (self.clock.now() - cached.loaded_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Drop the cached catalog; the next [`load`](Self::load) rebuilds it
    pub fn invalidate(&mut self) {
        if self.cached.take().is_some() {
            debug!("Catalog cache invalidated");
        }
    }

    /// Load the catalog, serving the cached copy while it is fresh
    pub async fn load(&mut self) -> Result<Arc<Catalog>, CatalogError> {
        if let Some(cached) = &self.cached {
            let age = self.age_of(cached);
            if age < self.ttl {
                trace!("Using cached catalog (age: {:?})", age);
                return Ok(Arc::clone(&cached.catalog));
            }
            debug!("Catalog cache expired (age: {:?})", age);
        }

        let db = self.database().await?;
        let catalog = Arc::new(Catalog::from_database(db));

        info!(
            "Loaded catalog: {} purchasable, {} retired",
            catalog.products().len(),
            catalog.retired().len()
        );

        self.cached = Some(CachedCatalog {
            loaded_at: self.clock.now(),
            catalog: Arc::clone(&catalog),
        });

        Ok(catalog)
    }

    /// The effective, unfiltered catalog database (discontinued included).
    ///
    /// Without a persisted layer this is the built-in catalog. With one, its
    /// entries win; built-in official entries it lacks are only folded in
    /// when the built-in catalog carries a newer version.
    pub async fn database(&self) -> Result<CatalogDatabase, CatalogError> {
        let Some(stored) = self.store.get(CATALOG_KEY).await? else {
            trace!("No persisted catalog layer; using built-in catalog");
            return Ok(self.builtin.clone());
        };

        let mut db: CatalogDatabase =
            serde_json::from_value(stored).map_err(CatalogError::Decode)?;

        if is_newer_version(&self.builtin.metadata.version, &db.metadata.version) {
            let known: HashSet<String> = db.products.iter().map(|p| p.id().to_string()).collect();
            let upgrades: Vec<Product> = self
                .builtin
                .products
                .iter()
                .filter(|p| p.source() == ProductSource::Official && !known.contains(p.id()))
                .cloned()
                .collect();

            info!(
                "Built-in catalog {} is newer than persisted {}; adding {} official products",
                self.builtin.metadata.version,
                db.metadata.version,
                upgrades.len()
            );

            db.products.extend(upgrades);
            db.metadata.version = self.builtin.metadata.version.clone();
            db.metadata.total_products = db.products.len() as u64;
        }

        Ok(db)
    }

    /// Replace the whole catalog with a new payload.
    ///
    /// The payload must validate with zero errors; otherwise nothing changes
    /// and the cached catalog stays as it was.
    pub async fn update(
        &mut self,
        payload: &serde_json::Value,
    ) -> Result<ValidationReport, CatalogError> {
        let report = self.validator.validate_database(payload)?;
        if !report.is_acceptable() {
            return Err(CatalogError::rejected(report));
        }

        let db: CatalogDatabase =
            serde_json::from_value(payload.clone()).map_err(CatalogError::Decode)?;

        self.write(&db).await?;

        info!(
            "Catalog replaced: version {}, {} products",
            db.metadata.version,
            db.products.len()
        );
        Ok(report)
    }

    /// Add one product. Ids must be new.
    pub async fn add_product(&mut self, product: Product) -> Result<ValidationReport, CatalogError> {
        let mut db = self.database().await?;

        if db.contains(product.id()) {
            return Err(CatalogError::DuplicateId(product.id().to_string()));
        }

        info!("Adding product {} ({})", product.id(), product.name());
        db.products.push(product);
        self.persist(db).await
    }

    /// Remove one product. `Ok(false)` when the id is unknown; nothing changes.
    pub async fn remove_product(&mut self, id: &str) -> Result<bool, CatalogError> {
        let mut db = self.database().await?;

        let Some(index) = db.products.iter().position(|p| p.id() == id) else {
            debug!("Product {} not in catalog; nothing removed", id);
            return Ok(false);
        };

        let removed = db.products.remove(index);
        info!("Removing product {} ({})", removed.id(), removed.name());
        self.persist(db).await?;
        Ok(true)
    }

    /// Upsert products from flat rows.
    ///
    /// Rows that do not map (missing id, name or primary part) or that fail
    /// product validation are skipped and listed in the summary; the rest
    /// are applied as one catalog mutation.
    pub async fn import_rows(&mut self, rows: &[TabularRow]) -> Result<ImportSummary, CatalogError> {
        let mut db = self.database().await?;
        let mut summary = ImportSummary::default();

        for (index, row) in rows.iter().enumerate() {
            let row_number = index + 1;

            let Some(product) = row_to_product(row) else {
                summary
                    .skipped
                    .push((row_number, "missing id, name or primary part name".to_string()));
                continue;
            };

            let value = serde_json::to_value(&product).map_err(CatalogError::Decode)?;
            let report = self.validator.validate_product(&value)?;
            if let Some(issue) = report.first_error() {
                warn!("Skipping import row {}: {}", row_number, issue);
                summary.skipped.push((row_number, issue.to_string()));
                continue;
            }

            match db.products.iter().position(|p| p.id() == product.id()) {
                Some(existing) => {
                    db.products[existing] = product;
                    summary.replaced += 1;
                }
                None => {
                    db.products.push(product);
                    summary.added += 1;
                }
            }
        }

        if summary.added + summary.replaced == 0 {
            info!("Import produced no products; catalog unchanged");
            return Ok(summary);
        }

        summary.report = self.persist(db).await?;
        info!(
            "Imported {} new and {} replaced products ({} rows skipped)",
            summary.added,
            summary.replaced,
            summary.skipped.len()
        );
        Ok(summary)
    }

    /// Flatten every product, discontinued included, into rows
    pub async fn export_rows(&self) -> Result<Vec<TabularRow>, CatalogError> {
        let db = self.database().await?;
        Ok(db.products.iter().map(product_to_row).collect())
    }

    /// Refresh bookkeeping metadata, validate the whole catalog, then write it
    async fn persist(&mut self, mut db: CatalogDatabase) -> Result<ValidationReport, CatalogError> {
        db.metadata.total_products = db.products.len() as u64;
        db.metadata.last_update = self.clock.now().format("%Y-%m-%d").to_string();

        let value = db.to_value()?;
        let report = self.validator.validate_database(&value)?;
        if !report.is_acceptable() {
            return Err(CatalogError::rejected(report));
        }

        self.write(&db).await?;
        Ok(report)
    }

    async fn write(&mut self, db: &CatalogDatabase) -> Result<(), CatalogError> {
        let value = db.to_value()?;
        let result = self.store.set(CATALOG_KEY, value).await;

        // Invalidate even on failure: the stored state is unknown
        self.invalidate();

        result?;
        debug!("Persisted catalog via {} store", self.store.name());
        Ok(())
    }
}

/// Compare dotted numeric versions (`1.10.0` > `1.9`). Unparseable
/// components compare as zero.
fn is_newer_version(candidate: &str, current: &str) -> bool {
    let parse = |v: &str| -> Vec<u64> {
        v.split('.')
            .map(|part| part.trim().parse::<u64>().unwrap_or(0))
            .collect()
    };

    let mut a = parse(candidate);
    let mut b = parse(current);
    let len = a.len().max(b.len());
    a.resize(len, 0);
    b.resize(len, 0);
    a > b
}
