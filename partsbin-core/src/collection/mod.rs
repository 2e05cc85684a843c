//! Ownership tracking
//!
//! The collection is a set of owned product ids plus a last-update stamp.
//! Owned parts are never stored; they are derived from the owned products
//! on every request.

mod store;

pub use store::{owned_parts, CollectionStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The user's ownership record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Owned product ids
    #[serde(default)]
    pub product_ids: BTreeSet<String>,

    /// When the record last changed
    pub last_update: DateTime<Utc>,
}

impl Collection {
    pub fn new(last_update: DateTime<Utc>) -> Self {
        Self {
            product_ids: BTreeSet::new(),
            last_update,
        }
    }

    pub fn owns(&self, id: &str) -> bool {
        self.product_ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.product_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.product_ids.is_empty()
    }
}
