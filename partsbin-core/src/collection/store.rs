//! Collection persistence (storage key `collection`)

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::Collection;
use crate::analysis::SlotSets;
use crate::catalog::Catalog;
use crate::clock::{Clock, SystemClock};
use crate::error::{CollectionError, StorageError};
use crate::model::Product;
use crate::storage::{KeyValueStore, COLLECTION_KEY};

/// Owns the set of product ids the user has marked as owned
pub struct CollectionStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl CollectionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Read the ownership record; an empty one when nothing was stored yet
    pub async fn load(&self) -> Result<Collection, CollectionError> {
        match self.store.get(COLLECTION_KEY).await? {
            Some(value) => serde_json::from_value(value).map_err(|source| {
                CollectionError::Storage(StorageError::Corrupted {
                    key: COLLECTION_KEY.to_string(),
                    source,
                })
            }),
            None => Ok(Collection::new(self.clock.now())),
        }
    }

    async fn save(&self, mut collection: Collection) -> Result<(), CollectionError> {
        collection.last_update = self.clock.now();
        let value = serde_json::to_value(&collection).map_err(|source| {
            CollectionError::Storage(StorageError::Corrupted {
                key: COLLECTION_KEY.to_string(),
                source,
            })
        })?;
        self.store.set(COLLECTION_KEY, value).await?;
        Ok(())
    }

    /// Mark a product as owned. Idempotent: returns `false` when it already was.
    pub async fn add_product(&self, id: &str) -> Result<bool, CollectionError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(CollectionError::EmptyId);
        }

        let mut collection = self.load().await?;
        if collection.owns(id) {
            debug!("Product {} already owned", id);
            return Ok(false);
        }

        collection.product_ids.insert(id.to_string());
        self.save(collection).await?;
        info!("Added {} to collection", id);
        Ok(true)
    }

    /// Unmark a product. Returns `false` when it was not owned.
    pub async fn remove_product(&self, id: &str) -> Result<bool, CollectionError> {
        let mut collection = self.load().await?;
        if !collection.product_ids.remove(id.trim()) {
            debug!("Product {} was not owned", id);
            return Ok(false);
        }

        self.save(collection).await?;
        info!("Removed {} from collection", id);
        Ok(true)
    }

    /// Resolve owned ids against the catalog. Ids the catalog no longer
    /// knows are dropped silently.
    pub async fn get_owned_products(&self, catalog: &Catalog) -> Result<Vec<Product>, CollectionError> {
        let collection = self.load().await?;

        let mut products = Vec::with_capacity(collection.len());
        let mut unknown = 0usize;
        for id in &collection.product_ids {
            match catalog.find(id) {
                Some(product) => products.push(product.clone()),
                None => unknown += 1,
            }
        }

        if unknown > 0 {
            warn!("{} owned ids no longer match a catalog product", unknown);
        }

        Ok(products)
    }

    /// Owned parts per slot, derived fresh from the owned products
    pub async fn get_owned_parts(&self, catalog: &Catalog) -> Result<SlotSets, CollectionError> {
        let products = self.get_owned_products(catalog).await?;
        Ok(owned_parts(&products))
    }
}

/// Union, per slot, of the part names of the given products
pub fn owned_parts(products: &[Product]) -> SlotSets {
    let mut parts = SlotSets::default();
    for product in products {
        for (slot, part) in product.parts().iter() {
            parts.insert(slot, &part.name);
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogDatabase;
    use crate::model::Slot;
    use crate::storage::InMemoryStore;

    fn store() -> CollectionStore {
        CollectionStore::new(Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let collection = store();

        assert!(collection.add_product("BX-01").await.unwrap());
        assert!(!collection.add_product("BX-01").await.unwrap());

        let record = collection.load().await.unwrap();
        assert_eq!(record.len(), 1);
        assert!(record.owns("BX-01"));
    }

    #[tokio::test]
    async fn test_remove_reports_not_owned() {
        let collection = store();
        collection.add_product("BX-01").await.unwrap();

        assert!(collection.remove_product("BX-01").await.unwrap());
        assert!(!collection.remove_product("BX-01").await.unwrap());
        assert!(collection.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_id_is_rejected() {
        let collection = store();
        assert!(matches!(
            collection.add_product("  ").await,
            Err(CollectionError::EmptyId)
        ));
    }

    #[tokio::test]
    async fn test_corrupted_record_is_a_storage_error() {
        let backing = Arc::new(InMemoryStore::new());
        backing
            .set(COLLECTION_KEY, serde_json::json!({ "productIds": 42 }))
            .await
            .unwrap();
        let collection = CollectionStore::new(backing);

        let err = collection.add_product("BX-01").await.unwrap_err();
        match err {
            CollectionError::Storage(StorageError::Corrupted { key, .. }) => {
                assert_eq!(key, COLLECTION_KEY)
            }
            other => panic!("expected a corrupted collection record, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_ids_are_dropped_and_retired_products_resolve() {
        let catalog = Catalog::from_database(CatalogDatabase::builtin().unwrap());
        let collection = store();
        collection.add_product("BX-01").await.unwrap();
        collection.add_product("BX-05").await.unwrap(); // discontinued
        collection.add_product("ZZ-404").await.unwrap();

        let products = collection.get_owned_products(&catalog).await.unwrap();
        let ids: Vec<_> = products.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["BX-01", "BX-05"]);

        let parts = collection.get_owned_parts(&catalog).await.unwrap();
        assert!(parts.contains(Slot::Primary, "Dran Sword"));
        assert!(parts.contains(Slot::Primary, "Wizard Arrow"));
        assert!(parts.contains(Slot::Tertiary, "Needle"));
        assert_eq!(parts.get(Slot::Secondary).len(), 2);
    }
}
