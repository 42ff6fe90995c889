//! # Payload Validation
//!
//! Framework-agnostic validation for API request payloads: required-field
//! presence checks with structured results, plus typed field schemas for
//! callers that need more than presence.
//!
//! Presence rule: a field is present when its key exists with a non-null
//! value. Empty strings and zero values count as present; an explicit JSON
//! `null` counts as missing.

pub mod schema;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Map;

pub use schema::{FieldSchema, FieldType, SchemaBuilder};

/// Structured validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    /// Required fields absent from the payload, sorted by name.
    pub missing_fields: Vec<String>,
    pub message: String,
    /// Present fields that failed a type check, keyed by field name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_fields: Option<BTreeMap<String, String>>,
}

/// Validates payloads against a field schema.
#[derive(Debug, Clone)]
pub struct PayloadValidator {
    schema: Vec<FieldSchema>,
}

impl PayloadValidator {
    pub fn new(schema: Vec<FieldSchema>) -> Self {
        Self { schema }
    }

    /// Validates a payload, reporting missing required fields and type
    /// failures for fields that are present. Pure: no I/O, no side effects.
    pub fn validate(&self, payload: &Map<String, serde_json::Value>) -> ValidationReport {
        let mut missing_fields: Vec<String> = self
            .schema
            .iter()
            .filter(|field| field.required && !is_present(payload, &field.name))
            .map(|field| field.name.clone())
            .collect();
        missing_fields.sort();

        let mut invalid_fields = BTreeMap::new();
        for field in &self.schema {
            if let Some(value) = payload.get(&field.name) {
                if value.is_null() {
                    continue;
                }
                if !field.field_type.matches(value) {
                    invalid_fields.insert(
                        field.name.clone(),
                        format!("Invalid type: expected {}", field.field_type.as_str()),
                    );
                }
            }
        }

        let is_valid = missing_fields.is_empty() && invalid_fields.is_empty();
        let message = build_message(is_valid, &missing_fields, &invalid_fields);

        ValidationReport {
            is_valid,
            missing_fields,
            message,
            invalid_fields: if invalid_fields.is_empty() {
                None
            } else {
                Some(invalid_fields)
            },
        }
    }
}

/// Quick validation for simple required-field checks.
pub fn validate_payload(
    payload: &Map<String, serde_json::Value>,
    required_fields: &[String],
) -> ValidationReport {
    let schema = required_fields
        .iter()
        .map(|name| FieldSchema::required(name.clone()))
        .collect();
    PayloadValidator::new(schema).validate(payload)
}

/// Quick validation with type checking for every listed field.
pub fn validate_with_types(
    payload: &Map<String, serde_json::Value>,
    field_types: &[(String, FieldType)],
) -> ValidationReport {
    let schema = field_types
        .iter()
        .map(|(name, field_type)| FieldSchema::required(name.clone()).field_type(*field_type))
        .collect();
    PayloadValidator::new(schema).validate(payload)
}

fn is_present(payload: &Map<String, serde_json::Value>, name: &str) -> bool {
    matches!(payload.get(name), Some(value) if !value.is_null())
}

fn build_message(
    is_valid: bool,
    missing_fields: &[String],
    invalid_fields: &BTreeMap<String, String>,
) -> String {
    if is_valid {
        return "Validation successful".to_string();
    }

    let mut parts = Vec::new();
    if !missing_fields.is_empty() {
        parts.push(format!("Missing required fields: {}", missing_fields.join(", ")));
    }
    if !invalid_fields.is_empty() {
        let listed: Vec<String> = invalid_fields
            .iter()
            .map(|(field, reason)| format!("{} ({})", field, reason))
            .collect();
        parts.push(format!("Invalid fields: {}", listed.join(", ")));
    }
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: serde_json::Value) -> Map<String, serde_json::Value> {
        value.as_object().cloned().unwrap()
    }

    fn required(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_fields_are_set_difference() {
        let payload = map(json!({"username": "john", "email": "john@example.com"}));
        let report = validate_payload(&payload, &required(&["username", "email", "password"]));

        assert!(!report.is_valid);
        assert_eq!(report.missing_fields, vec!["password"]);
        assert_eq!(report.message, "Missing required fields: password");
    }

    #[test]
    fn test_valid_when_nothing_missing() {
        let payload = map(json!({"username": "john", "email": "john@example.com"}));
        let report = validate_payload(&payload, &required(&["username", "email"]));

        assert!(report.is_valid);
        assert!(report.missing_fields.is_empty());
        assert_eq!(report.message, "Validation successful");
    }

    #[test]
    fn test_missing_fields_are_sorted() {
        let payload = map(json!({}));
        let report = validate_payload(&payload, &required(&["zeta", "alpha", "mid"]));

        assert_eq!(report.missing_fields, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_empty_string_and_zero_count_as_present() {
        let payload = map(json!({"name": "", "count": 0, "flag": false}));
        let report = validate_payload(&payload, &required(&["name", "count", "flag"]));

        assert!(report.is_valid);
    }

    #[test]
    fn test_explicit_null_counts_as_missing() {
        let payload = map(json!({"name": null}));
        let report = validate_payload(&payload, &required(&["name"]));

        assert!(!report.is_valid);
        assert_eq!(report.missing_fields, vec!["name"]);
    }

    #[test]
    fn test_type_checks_report_invalid_fields() {
        let payload = map(json!({
            "user_id": "not-a-number",
            "email": "user@example.com",
            "is_active": true
        }));
        let report = validate_with_types(
            &payload,
            &[
                ("user_id".to_string(), FieldType::Integer),
                ("email".to_string(), FieldType::Email),
                ("is_active".to_string(), FieldType::Boolean),
            ],
        );

        assert!(!report.is_valid);
        let invalid = report.invalid_fields.unwrap();
        assert_eq!(invalid.len(), 1);
        assert!(invalid["user_id"].contains("expected integer"));
        assert!(report.message.contains("Invalid fields"));
    }

    #[test]
    fn test_optional_fields_do_not_report_missing() {
        let schema = SchemaBuilder::new()
            .field(FieldSchema::required("error_type").field_type(FieldType::String))
            .field(FieldSchema::optional("stack_trace").field_type(FieldType::String))
            .build();
        let payload = map(json!({"error_type": "DbError"}));

        let report = PayloadValidator::new(schema).validate(&payload);
        assert!(report.is_valid);
    }
}
