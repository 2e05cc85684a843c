//! Composition facade
//!
//! Wires the catalog cache, the collection store and the optimizer behind
//! two requests: "what am I missing" ([`Planner::gap`]) and "what should I
//! buy" ([`Planner::plan`]). Owned parts are derived fresh on every call.

use std::sync::Arc;
use tracing::debug;

use crate::analysis::{analyze_gap, AssemblyRequest, GapReport, SlotSets};
use crate::catalog::{CatalogCache, CatalogDatabase};
use crate::clock::Clock;
use crate::collection::CollectionStore;
use crate::config::PartsbinConfig;
use crate::error::PlannerError;
use crate::optimizer::{OptimizationResult, PurchaseOptimizer};
use crate::storage::KeyValueStore;

pub struct Planner {
    catalog: CatalogCache,
    collection: CollectionStore,
    optimizer: PurchaseOptimizer,
}

impl Planner {
    pub fn new(catalog: CatalogCache, collection: CollectionStore, optimizer: PurchaseOptimizer) -> Self {
        Self {
            catalog,
            collection,
            optimizer,
        }
    }

    /// Build a planner over one store using the built-in catalog and the
    /// configured TTL and weights
    pub fn from_config(
        store: Arc<dyn KeyValueStore>,
        config: &PartsbinConfig,
    ) -> Result<Self, PlannerError> {
        let builtin = CatalogDatabase::builtin()?;
        Ok(Self::new(
            CatalogCache::new(Arc::clone(&store), builtin).with_ttl(config.cache_ttl()),
            CollectionStore::new(store),
            PurchaseOptimizer::new(config.weights.clone()),
        ))
    }

    /// Use one time source for both the cache and the collection
    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog: self.catalog.with_clock(Arc::clone(&clock)),
            collection: self.collection.with_clock(clock),
            optimizer: self.optimizer,
        }
    }

    pub fn catalog(&mut self) -> &mut CatalogCache {
        &mut self.catalog
    }

    pub fn collection(&self) -> &CollectionStore {
        &self.collection
    }

    pub fn optimizer(&self) -> &PurchaseOptimizer {
        &self.optimizer
    }

    /// Parts of every owned product, retired ones included
    pub async fn owned_parts(&mut self) -> Result<SlotSets, PlannerError> {
        let catalog = self.catalog.load().await?;
        Ok(self.collection.get_owned_parts(&catalog).await?)
    }

    pub async fn gap(&mut self, request: &AssemblyRequest) -> Result<GapReport, PlannerError> {
        let owned = self.owned_parts().await?;
        let report = analyze_gap(request, &owned);
        debug!(
            "Gap: {}/{} parts owned ({}%)",
            report.owned_count, report.needed_count, report.completion_percentage
        );
        Ok(report)
    }

    pub async fn plan(&mut self, request: &AssemblyRequest) -> Result<OptimizationResult, PlannerError> {
        let catalog = self.catalog.load().await?;
        let owned = self.collection.get_owned_parts(&catalog).await?;
        let report = analyze_gap(request, &owned);
        Ok(self.optimizer.optimize(&report, &catalog))
    }
}
