//! Partsbin library exports
//!
//! Tracks which three-part products a user owns, works out which parts are
//! still missing for a set of desired builds, and recommends what to buy.

pub mod analysis;
pub mod catalog;
pub mod clock;
pub mod collection;
pub mod config;
pub mod error;
pub mod model;
pub mod optimizer;
pub mod planner;
pub mod storage;
pub mod tabular;
pub mod validator;

pub use analysis::{analyze_gap, AssemblyRequest, GapReport, PartTriad, SlotSets};
pub use catalog::{Catalog, CatalogCache, CatalogDatabase};
pub use collection::CollectionStore;
pub use config::PartsbinConfig;
pub use optimizer::{OptimizationResult, PurchaseOptimizer, PurchaseStatus};
pub use planner::Planner;
