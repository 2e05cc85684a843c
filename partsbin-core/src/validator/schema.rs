//! Catalog schemas: metadata, product, and the top-level database shape

use once_cell::sync::Lazy;
use regex::Regex;

use super::{FieldRule, Schema};

/// Official product ids: a 2-4 letter line code, a number, optional suffixes (`BX-01`, `UX-08-R`)
pub static ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2,4}-\d{2,3}(-[A-Z0-9]+)*$").unwrap());

/// User-authored ids only need to be slug-like
pub static CUSTOM_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").unwrap());

/// `<int>-<int>¥`
pub static PRICE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+-\d+¥$").unwrap());

/// `YYYY-MM`
pub static RELEASE_DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").unwrap());

pub static VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+(\.\d+)?$").unwrap());

/// ISO date, optionally followed by a time component
pub static LAST_UPDATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}([T ].*)?$").unwrap());

pub const TIER_VALUES: &[&str] = &["S+", "S", "A", "B"];
pub const CATEGORY_VALUES: &[&str] = &["Attack", "Defense", "Stamina", "Balance"];
pub const STATUS_VALUES: &[&str] = &["active", "upcoming", "discontinued"];
pub const SOURCE_VALUES: &[&str] = &["official", "custom"];

/// Only the primary part must be named; the other slots may be left blank
fn part_schema(min_name_length: usize) -> Schema {
    Schema::new()
        .field(
            "name",
            FieldRule::string().required().length(min_name_length, 60),
        )
        .field("category", FieldRule::one_of(CATEGORY_VALUES).required())
}

fn parts_schema() -> Schema {
    Schema::new()
        .field("primary", FieldRule::object(part_schema(1)).required())
        .field("secondary", FieldRule::object(part_schema(0)).required())
        .field("tertiary", FieldRule::object(part_schema(0)).required())
}

fn base_product_schema(id: FieldRule, format: FieldRule) -> Schema {
    Schema::new()
        .field("id", id)
        .field("name", FieldRule::string().required().length(1, 100))
        .field("parts", FieldRule::object(parts_schema()).required())
        .field("price", FieldRule::string().required().pattern(&PRICE_PATTERN))
        .field("tier", FieldRule::one_of(TIER_VALUES).required())
        .field("format", format)
        .field("setName", FieldRule::string().length(1, 100))
        .field(
            "releaseDate",
            FieldRule::string().required().pattern(&RELEASE_DATE_PATTERN),
        )
        .field("status", FieldRule::one_of(STATUS_VALUES).required())
        .field("source", FieldRule::one_of(SOURCE_VALUES))
}

/// Schema for curated catalog entries
pub fn product_schema() -> Schema {
    base_product_schema(
        FieldRule::string().required().pattern(&ID_PATTERN),
        FieldRule::string().required().length(1, 50),
    )
}

/// Schema for user-authored entries: loose id, optional format
pub fn custom_product_schema() -> Schema {
    base_product_schema(
        FieldRule::string()
            .required()
            .pattern(&CUSTOM_ID_PATTERN)
            .length(1, 64),
        FieldRule::string().length(0, 50),
    )
}

pub fn metadata_schema() -> Schema {
    Schema::new()
        .field("version", FieldRule::string().required().pattern(&VERSION_PATTERN))
        .field(
            "lastUpdate",
            FieldRule::string().required().pattern(&LAST_UPDATE_PATTERN),
        )
        .field(
            "totalProducts",
            FieldRule::integer().required().range(Some(0.0), None),
        )
        .field("description", FieldRule::string().length(0, 500))
        .field(
            "formats",
            FieldRule::array().items(FieldRule::string().length(1, 50)),
        )
        .field("tiers", FieldRule::array().items(FieldRule::one_of(TIER_VALUES)))
}

/// Top-level payload shape. Product elements are checked individually
/// because their schema depends on `source`.
pub fn database_schema() -> Schema {
    Schema::new()
        .field("metadata", FieldRule::object(metadata_schema()).required())
        .field("products", FieldRule::array().required())
}
