//! Error types for the partsbin core with clear, actionable messages

use thiserror::Error;

use crate::validator::ValidationReport;

/// Failures parsing the string-encoded value types (prices, dates, enums)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid price range '{0}'. Expected '<min>-<max>' with an optional currency suffix (e.g. 1980-2200¥)")]
    Price(String),

    #[error("Price range '{0}' has a minimum greater than its maximum")]
    InvertedPrice(String),

    #[error("Invalid release date '{0}'. Expected YYYY-MM")]
    YearMonth(String),

    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}

/// Hard input-contract violations raised by the schema validator
///
/// Invalid data is always reported through a [`ValidationReport`]; only an
/// input that is not an object at all is raised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{name} must be a JSON object, got {found}")]
    NotAnObject { name: String, found: &'static str },
}

/// Persistence boundary failures
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid storage key '{0}'. Keys may only contain lowercase letters, digits, '-' and '_'")]
    InvalidKey(String),

    #[error("Failed to read key '{key}' from storage")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write key '{key}' to storage")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored document for key '{key}' is corrupted")]
    Corrupted {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Catalog cache failures
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A mutation produced a catalog that fails validation; prior state is untouched
    #[error("Catalog update rejected: {first_error}")]
    Rejected {
        first_error: String,
        report: Box<ValidationReport>,
    },

    #[error(transparent)]
    Malformed(#[from] ValidationError),

    #[error("Product '{0}' already exists in the catalog")]
    DuplicateId(String),

    #[error("Catalog document could not be decoded")]
    Decode(#[source] serde_json::Error),

    #[error("Built-in catalog is invalid: {0}")]
    Builtin(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Collection store failures
#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("Product id must not be empty")]
    EmptyId,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Planner failures
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Collection(#[from] CollectionError),
}

impl CatalogError {
    /// Build a rejection from a report that carries at least one error
    pub fn rejected(report: ValidationReport) -> Self {
        let first_error = report
            .errors
            .first()
            .map(|issue| issue.to_string())
            .unwrap_or_else(|| "unknown validation failure".to_string());
        tracing::warn!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Catalog mutation rejected: {}",
            first_error
        );
        CatalogError::Rejected {
            first_error,
            report: Box::new(report),
        }
    }
}
