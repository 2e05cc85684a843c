//! End-to-end planning scenarios through the planner facade

mod common;

use async_trait::async_trait;
use common::{database, init_test_logging, manual_clock, memory_store, official, planner_with};
use partsbin_core::analysis::{AssemblyRequest, PartTriad, SlotSets};
use partsbin_core::catalog::CatalogCache;
use partsbin_core::error::{CatalogError, StorageError};
use partsbin_core::model::{Slot, Tier};
use partsbin_core::optimizer::PurchaseStatus;
use partsbin_core::storage::{InMemoryStore, KeyValueStore};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn request(builds: &[(&str, &str, &str)]) -> AssemblyRequest {
    AssemblyRequest::new(
        builds
            .iter()
            .map(|(p, s, t)| PartTriad::new(*p, *s, *t))
            .collect(),
    )
}

#[tokio::test]
async fn test_cheaper_full_cover_beats_higher_tier_partial_cover() {
    init_test_logging();
    let builtin = database(
        "1.0",
        vec![
            official("PP-01", Tier::S, 20, ("A", "X", "1")),
            official("PP-02", Tier::A, 10, ("A", "Y", "2")),
        ],
    );
    let mut planner = planner_with(memory_store(), builtin, manual_clock());

    let result = planner.plan(&request(&[("A", "Y", "")])).await.unwrap();

    let mut expected = SlotSets::default();
    expected.insert(Slot::Primary, "A");
    expected.insert(Slot::Secondary, "Y");
    assert_eq!(result.analysis.missing, expected);

    let chosen: Vec<&str> = result.optimal_solution.iter().map(|c| c.product.id()).collect();
    assert_eq!(chosen, vec!["PP-02"]);
    assert!(result.optimal_solution[0].utility_score > 0.0);
    assert_eq!(result.total_cost, 10.0);
    assert_eq!(result.status, PurchaseStatus::FullyCovered);
}

#[tokio::test]
async fn test_request_satisfied_by_owned_product_needs_no_purchase() {
    init_test_logging();
    let builtin = database(
        "1.0",
        vec![
            official("PP-01", Tier::S, 20, ("A", "X", "1")),
            official("PP-02", Tier::A, 10, ("A", "Y", "2")),
        ],
    );
    let mut planner = planner_with(memory_store(), builtin, manual_clock());
    planner.collection().add_product("PP-01").await.unwrap();

    let result = planner.plan(&request(&[("A", "X", "1")])).await.unwrap();

    assert_eq!(result.analysis.completion_percentage, 100);
    assert!(!result.needs_purchase);
    assert_eq!(result.status, PurchaseStatus::GapClosed);
    assert!(result.optimal_solution.is_empty());
    assert!(result.alternatives.is_empty());
}

#[tokio::test]
async fn test_uncoverable_tertiary_is_flagged_with_partial_solution() {
    init_test_logging();
    let builtin = database(
        "1.0",
        vec![
            official("PP-01", Tier::S, 20, ("A", "X", "1")),
            official("PP-02", Tier::B, 10, ("B", "Y", "2")),
        ],
    );
    let mut planner = planner_with(memory_store(), builtin, manual_clock());

    let result = planner.plan(&request(&[("A", "Y", "Missing")])).await.unwrap();

    assert!(result.needs_purchase);
    assert_eq!(result.status, PurchaseStatus::PartiallyCovered);
    let chosen: Vec<&str> = result.optimal_solution.iter().map(|c| c.product.id()).collect();
    assert_eq!(chosen, vec!["PP-01", "PP-02"]);

    let mut uncoverable = SlotSets::default();
    uncoverable.insert(Slot::Tertiary, "Missing");
    assert_eq!(result.uncoverable, uncoverable);
}

#[tokio::test]
async fn test_no_candidate_is_distinct_from_gap_closed() {
    let builtin = database("1.0", vec![official("PP-01", Tier::S, 20, ("A", "X", "1"))]);
    let mut planner = planner_with(memory_store(), builtin, manual_clock());

    let result = planner.plan(&request(&[("Nothing", "", "")])).await.unwrap();
    assert!(result.needs_purchase);
    assert_eq!(result.status, PurchaseStatus::NoCoverageAvailable);
    assert_eq!(result.uncoverable.len(), 1);
}

#[tokio::test]
async fn test_catalog_removal_is_seen_by_next_plan() {
    init_test_logging();
    let builtin = database(
        "1.0",
        vec![
            official("PP-01", Tier::S, 20, ("A", "X", "1")),
            official("PP-02", Tier::A, 30, ("A", "Q", "9")),
        ],
    );
    let mut planner = planner_with(memory_store(), builtin, manual_clock());
    let wanted = request(&[("A", "", "")]);

    let before = planner.plan(&wanted).await.unwrap();
    assert_eq!(before.optimal_solution[0].product.id(), "PP-01");

    assert!(planner.catalog().remove_product("PP-01").await.unwrap());

    let after = planner.plan(&wanted).await.unwrap();
    assert_eq!(after.optimal_solution[0].product.id(), "PP-02");
}

#[tokio::test]
async fn test_savings_stay_in_bounds_on_builtin_catalog() {
    init_test_logging();
    let builtin = partsbin_core::CatalogDatabase::builtin().unwrap();
    let mut planner = planner_with(memory_store(), builtin, manual_clock());
    planner.collection().add_product("BX-01").await.unwrap();

    let result = planner
        .plan(&request(&[
            ("Dran Sword", "4-60", "Ball"),
            ("Wizard Arrow", "3-80", "Rush"),
            ("Viper Tail", "5-60", "Low Flat"),
        ]))
        .await
        .unwrap();

    assert!(result.needs_purchase);
    assert_eq!(result.status, PurchaseStatus::FullyCovered);
    assert!(result.savings.amount >= 0.0);
    assert!(result.savings.percentage <= 100);
    assert!(result
        .optimal_solution
        .iter()
        .all(|c| !c.product.is_discontinued()));
}

/// Store whose writes can be switched off
struct FlakyStore {
    inner: InMemoryStore,
    fail_writes: AtomicBool,
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("disk full".to_string()));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.remove(key).await
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        self.inner.list().await
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}

#[tokio::test]
async fn test_storage_failure_propagates_and_keeps_prior_state() {
    init_test_logging();
    let store = Arc::new(FlakyStore {
        inner: InMemoryStore::new(),
        fail_writes: AtomicBool::new(false),
    });
    let builtin = database("1.0", vec![official("PP-01", Tier::S, 20, ("A", "X", "1"))]);
    let mut cache = CatalogCache::new(store.clone(), builtin);
    cache.load().await.unwrap();

    store.fail_writes.store(true, Ordering::SeqCst);
    let err = cache
        .add_product(official("PP-02", Tier::A, 10, ("B", "Y", "2")))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Storage(StorageError::Unavailable(_))
    ));

    let catalog = cache.load().await.unwrap();
    assert_eq!(catalog.len(), 1);
}
