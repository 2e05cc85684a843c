//! Schema Validator - structural and semantic validation of catalog payloads
//!
//! Validates raw JSON against field-level rules before anything reaches the
//! catalog cache. Invalid data is always reported, never raised: a report
//! carries blocking errors and advisory warnings. The only hard failure is an
//! input that is not a JSON object at all.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

pub mod schema;


use crate::error::{ParseError, ValidationError};
use crate::model::PriceRange;

/// Severity levels for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,   // Blocks ingestion
    Warning, // Surfaced for visibility only
}

/// A validation issue found in a payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Severity of the issue
    pub severity: Severity,
    /// Identifier of the check that produced the issue
    pub rule_id: &'static str,
    /// Dotted path of the offending field (e.g. `products[2].parts.primary.name`)
    pub path: String,
    /// Human-readable description
    pub message: String,
}

impl ValidationIssue {
    fn error(rule_id: &'static str, path: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            rule_id,
            path: path.to_string(),
            message: message.into(),
        }
    }

    fn warning(rule_id: &'static str, path: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            rule_id,
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.path, self.message, self.rule_id)
    }
}

/// JSON value kinds a field rule can demand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    /// A whole number (no fractional part)
    Integer,
    Array,
    Object,
    /// A string drawn from a closed set of values
    Enum,
}

impl FieldType {
    fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Enum => "enum",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::String | FieldType::Enum => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Integer => value.is_u64() || value.is_i64(),
            FieldType::Array => value.is_array(),
            FieldType::Object => value.is_object(),
        }
    }
}

/// Field-level validation rule
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub required: bool,
    pub field_type: FieldType,
    pub pattern: Option<Regex>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub values: Vec<&'static str>,
    /// Sub-schema applied when the field is an object
    pub schema: Option<Schema>,
    /// Rule applied to every element when the field is an array
    pub items: Option<Box<FieldRule>>,
}

impl FieldRule {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            required: false,
            field_type,
            pattern: None,
            min_length: None,
            max_length: None,
            min: None,
            max: None,
            values: Vec::new(),
            schema: None,
            items: None,
        }
    }

    pub fn string() -> Self {
        Self::new(FieldType::String)
    }

    pub fn number() -> Self {
        Self::new(FieldType::Number)
    }

    pub fn integer() -> Self {
        Self::new(FieldType::Integer)
    }

    pub fn array() -> Self {
        Self::new(FieldType::Array)
    }

    pub fn object(schema: Schema) -> Self {
        Self::new(FieldType::Object).with_schema(schema)
    }

    pub fn one_of(values: &[&'static str]) -> Self {
        let mut rule = Self::new(FieldType::Enum);
        rule.values = values.to_vec();
        rule
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn pattern(mut self, pattern: &Regex) -> Self {
        self.pattern = Some(pattern.clone());
        self
    }

    pub fn length(mut self, min: usize, max: usize) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn items(mut self, rule: FieldRule) -> Self {
        self.items = Some(Box::new(rule));
        self
    }
}

/// An ordered set of named field rules describing one object shape
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(&'static str, FieldRule)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, rule: FieldRule) -> Self {
        self.fields.push((name, rule));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, rule)| rule)
    }

    pub fn fields(&self) -> impl Iterator<Item = &(&'static str, FieldRule)> {
        self.fields.iter()
    }

    fn knows(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| *field == name)
    }
}

/// Outcome of checking a single field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
}

/// Full validation report for an object, a product, or a whole database
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn from_issues(errors: Vec<ValidationIssue>, warnings: Vec<ValidationIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// A database is acceptable for ingestion iff it has no errors
    pub fn is_acceptable(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn first_error(&self) -> Option<&ValidationIssue> {
        self.errors.first()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    fn absorb(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.valid = self.errors.is_empty();
    }
}

/// Validates catalog payloads against the product, metadata and database schemas
pub struct SchemaValidator {
    product: Schema,
    custom_product: Schema,
    database: Schema,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaValidator {
    /// Create validator with the built-in catalog schemas
    pub fn new() -> Self {
        Self {
            product: schema::product_schema(),
            custom_product: schema::custom_product_schema(),
            database: schema::database_schema(),
        }
    }

    /// Check one value against one rule.
    ///
    /// Checks run in order: presence, type, pattern, length, numeric range,
    /// enum membership. A missing required field yields exactly one error and
    /// nothing else is checked; a type mismatch also stops the chain.
    pub fn validate_field(&self, value: Option<&Value>, rule: &FieldRule, path: &str) -> FieldResult {
        validate_field(value, rule, path)
    }

    /// Validate an object against a schema, recursing into nested objects.
    ///
    /// Unknown properties are warnings, never errors.
    pub fn validate_object(
        &self,
        obj: &Value,
        schema: &Schema,
        object_name: &str,
    ) -> Result<ValidationReport, ValidationError> {
        let map = as_object(obj, object_name)?;
        Ok(validate_map(map, schema, object_name))
    }

    /// Validate a single product record
    pub fn validate_product(&self, product: &Value) -> Result<ValidationReport, ValidationError> {
        as_object(product, "product")?;
        Ok(self.validate_product_at(product, "product"))
    }

    /// Validate a full catalog payload: metadata, every product, duplicate
    /// ids (error), duplicate names (warning), and the informational product
    /// count (warning on mismatch).
    pub fn validate_database(&self, db: &Value) -> Result<ValidationReport, ValidationError> {
        let map = as_object(db, "database")?;

        let mut report = validate_map(map, &self.database, "database");

        let products = match map.get("products").and_then(Value::as_array) {
            Some(products) => products,
            None => {
                debug!("Database has no products array; skipping product checks");
                return Ok(report);
            }
        };

        let mut seen_ids: HashMap<&str, usize> = HashMap::new();
        let mut seen_names: HashMap<&str, usize> = HashMap::new();

        for (index, product) in products.iter().enumerate() {
            let path = format!("products[{index}]");

            if !product.is_object() {
                report.errors.push(ValidationIssue::error(
                    "type",
                    &path,
                    format!("expected object, got {}", json_type_name(product)),
                ));
                continue;
            }

            report.absorb(self.validate_product_at(product, &path));

            if let Some(id) = product.get("id").and_then(Value::as_str) {
                if let Some(first) = seen_ids.insert(id, index) {
                    report.errors.push(ValidationIssue::error(
                        "duplicate-id",
                        &format!("{path}.id"),
                        format!("duplicate product id '{id}' (first seen at products[{first}])"),
                    ));
                }
            }

            if let Some(name) = product.get("name").and_then(Value::as_str) {
                if let Some(first) = seen_names.insert(name, index) {
                    report.warnings.push(ValidationIssue::warning(
                        "duplicate-name",
                        &format!("{path}.name"),
                        format!("duplicate product name '{name}' (first seen at products[{first}])"),
                    ));
                }
            }
        }

        let declared = map
            .get("metadata")
            .and_then(|m| m.get("totalProducts"))
            .and_then(Value::as_f64);
        if let Some(declared) = declared {
            if declared != products.len() as f64 {
                report.warnings.push(ValidationIssue::warning(
                    "count-mismatch",
                    "metadata.totalProducts",
                    format!(
                        "declares {} products but {} are present",
                        declared,
                        products.len()
                    ),
                ));
            }
        }

        report.valid = report.errors.is_empty();

        info!(
            "Validated catalog: {} products, {} errors, {} warnings",
            products.len(),
            report.errors.len(),
            report.warnings.len()
        );

        Ok(report)
    }

    fn validate_product_at(&self, product: &Value, path: &str) -> ValidationReport {
        let Some(map) = product.as_object() else {
            return ValidationReport::from_issues(
                vec![ValidationIssue::error(
                    "type",
                    path,
                    format!("expected object, got {}", json_type_name(product)),
                )],
                Vec::new(),
            );
        };

        let is_custom = map.get("source").and_then(Value::as_str) == Some("custom");
        let schema = if is_custom {
            &self.custom_product
        } else {
            &self.product
        };

        let mut report = validate_map(map, schema, path);

        // Pattern-valid prices can still be inverted or overflow
        if let Some(raw) = map.get("price").and_then(Value::as_str) {
            if schema::PRICE_PATTERN.is_match(raw) {
                let issue = match raw.parse::<PriceRange>() {
                    Ok(_) => None,
                    Err(ParseError::InvertedPrice(_)) => Some((
                        "price-order",
                        format!("minimum exceeds maximum in '{raw}'"),
                    )),
                    Err(_) => Some((
                        "range",
                        format!("price value out of range in '{raw}'"),
                    )),
                };
                if let Some((rule_id, message)) = issue {
                    report
                        .errors
                        .push(ValidationIssue::error(rule_id, &format!("{path}.price"), message));
                    report.valid = false;
                }
            }
        }

        report
    }
}

fn as_object<'a>(value: &'a Value, name: &str) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| ValidationError::NotAnObject {
        name: name.to_string(),
        found: json_type_name(value),
    })
}

fn validate_map(map: &Map<String, Value>, schema: &Schema, path: &str) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (name, rule) in schema.fields() {
        let field_path = format!("{path}.{name}");
        let value = map.get(*name);

        let result = validate_field(value, rule, &field_path);
        let field_ok = result.valid;
        errors.extend(result.errors);

        if !field_ok {
            continue;
        }

        match value {
            Some(Value::Object(nested)) => {
                if let Some(sub_schema) = &rule.schema {
                    let nested_report = validate_map(nested, sub_schema, &field_path);
                    errors.extend(nested_report.errors);
                    warnings.extend(nested_report.warnings);
                }
            }
            Some(Value::Array(elements)) => {
                if let Some(item_rule) = &rule.items {
                    for (index, element) in elements.iter().enumerate() {
                        let item_path = format!("{field_path}[{index}]");
                        let item = validate_field(Some(element), item_rule, &item_path);
                        let item_ok = item.valid;
                        errors.extend(item.errors);

                        if let (true, Some(sub_schema), Value::Object(nested)) =
                            (item_ok, &item_rule.schema, element)
                        {
                            let nested_report = validate_map(nested, sub_schema, &item_path);
                            errors.extend(nested_report.errors);
                            warnings.extend(nested_report.warnings);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    for key in map.keys() {
        if !schema.knows(key) {
            warnings.push(ValidationIssue::warning(
                "unknown-property",
                &format!("{path}.{key}"),
                "unknown property (ignored)",
            ));
        }
    }

    ValidationReport::from_issues(errors, warnings)
}

/// Check one value against one rule. See [`SchemaValidator::validate_field`].
pub fn validate_field(value: Option<&Value>, rule: &FieldRule, path: &str) -> FieldResult {
    let mut errors = Vec::new();

    let value = match value {
        Some(Value::Null) | None => {
            if rule.required {
                errors.push(ValidationIssue::error(
                    "required",
                    path,
                    "required field is missing",
                ));
            }
            return FieldResult {
                valid: errors.is_empty(),
                errors,
            };
        }
        Some(value) => value,
    };

    if !rule.field_type.accepts(value) {
        errors.push(ValidationIssue::error(
            "type",
            path,
            format!(
                "expected {}, got {}",
                rule.field_type.as_str(),
                json_type_name(value)
            ),
        ));
        return FieldResult {
            valid: false,
            errors,
        };
    }

    if let (Some(pattern), Some(text)) = (&rule.pattern, value.as_str()) {
        if !pattern.is_match(text) {
            errors.push(ValidationIssue::error(
                "pattern",
                path,
                format!("'{}' does not match pattern {}", text, pattern.as_str()),
            ));
        }
    }

    let length = match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(a) => Some(a.len()),
        _ => None,
    };
    if let Some(length) = length {
        if let Some(min) = rule.min_length {
            if length < min {
                errors.push(ValidationIssue::error(
                    "length",
                    path,
                    format!("length {length} is below the minimum of {min}"),
                ));
            }
        }
        if let Some(max) = rule.max_length {
            if length > max {
                errors.push(ValidationIssue::error(
                    "length",
                    path,
                    format!("length {length} exceeds the maximum of {max}"),
                ));
            }
        }
    }

    if let Some(number) = value.as_f64() {
        if let Some(min) = rule.min {
            if number < min {
                errors.push(ValidationIssue::error(
                    "range",
                    path,
                    format!("{number} is below the minimum of {min}"),
                ));
            }
        }
        if let Some(max) = rule.max {
            if number > max {
                errors.push(ValidationIssue::error(
                    "range",
                    path,
                    format!("{number} exceeds the maximum of {max}"),
                ));
            }
        }
    }

    if !rule.values.is_empty() {
        if let Some(text) = value.as_str() {
            if !rule.values.contains(&text) {
                errors.push(ValidationIssue::error(
                    "enum",
                    path,
                    format!("'{}' is not one of {:?}", text, rule.values),
                ));
            }
        }
    }

    FieldResult {
        valid: errors.is_empty(),
        errors,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
