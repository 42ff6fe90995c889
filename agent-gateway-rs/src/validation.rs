//! Gateway request validation.
//!
//! First line of defense for the agent endpoints: required-field checks
//! driven by the payload validator, plus enum and range checks for the
//! wire-level vocabulary. Input errors are reported as 400 responses with
//! an itemized per-field list and are never partially processed.

use std::collections::HashMap;
use std::str::FromStr;

use axum::http::StatusCode;
use axum::Json;
use once_cell::sync::Lazy;
use serde_json::Value;

use shared_types::{ActionType, EventCategory, SeverityLevel};

/// Default maximum request payload size (1MB).
pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

/// Required fields per endpoint.
static REQUIRED_FIELDS: Lazy<HashMap<&'static str, Vec<String>>> = Lazy::new(|| {
    HashMap::from([
        (
            "/analyze-event",
            vec!["error_type".to_string(), "message".to_string()],
        ),
        (
            "/decide-action",
            vec![
                "event_type".to_string(),
                "severity".to_string(),
                "message".to_string(),
            ],
        ),
        (
            "/execute-action",
            vec![
                "action".to_string(),
                "priority".to_string(),
                "event_type".to_string(),
                "severity".to_string(),
                "message".to_string(),
            ],
        ),
        (
            "/validate-payload",
            vec!["payload".to_string(), "required_fields".to_string()],
        ),
    ])
});

/// Error response for validation failures.
#[derive(Debug, serde::Serialize)]
pub struct ValidationErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

/// Validation error for API requests.
#[derive(Debug, thiserror::Error)]
pub enum ApiValidationError {
    #[error("Invalid request format: {0}")]
    InvalidFormat(String),

    #[error("{message}")]
    MissingFields { fields: Vec<String>, message: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ApiValidationError {
    /// Convert to HTTP status code and error response.
    pub fn to_response(&self) -> (StatusCode, Json<ValidationErrorResponse>) {
        let details = match self {
            Self::MissingFields { fields, .. } => Some(
                fields
                    .iter()
                    .map(|field| format!("{}: field is required", field))
                    .collect(),
            ),
            Self::InvalidValue { field, reason } => Some(vec![format!("{}: {}", field, reason)]),
            Self::InvalidFormat(_) => None,
        };

        (
            StatusCode::BAD_REQUEST,
            Json(ValidationErrorResponse {
                error: self.to_string(),
                code: 400,
                details,
            }),
        )
    }
}

/// Validate an API request body by path.
pub fn validate_request(path: &str, payload: &Value) -> Result<(), ApiValidationError> {
    let Some(object) = payload.as_object() else {
        return Err(ApiValidationError::InvalidFormat(
            "request body must be a JSON object".to_string(),
        ));
    };

    let Some(required) = REQUIRED_FIELDS.get(path) else {
        return Ok(());
    };

    let mut required = required.clone();
    // `event_type` is an accepted alias for `error_type` on the analyze
    // endpoint.
    if path == "/analyze-event"
        && matches!(object.get("event_type"), Some(value) if !value.is_null())
    {
        required.retain(|field| field != "error_type");
    }

    let report = payload_validation::validate_payload(object, &required);
    if !report.is_valid {
        return Err(ApiValidationError::MissingFields {
            fields: report.missing_fields,
            message: report.message,
        });
    }

    validate_field_values(path, object)
}

/// Enum and range checks for fields that made it past the presence check.
fn validate_field_values(
    path: &str,
    object: &serde_json::Map<String, Value>,
) -> Result<(), ApiValidationError> {
    match path {
        "/decide-action" | "/execute-action" => {
            parse_enum_field::<EventCategory>(object, "event_type")?;
            parse_enum_field::<SeverityLevel>(object, "severity")?;
        }
        _ => {}
    }

    if path == "/execute-action" {
        parse_enum_field::<ActionType>(object, "action")?;

        let priority = object.get("priority").and_then(Value::as_u64);
        if !matches!(priority, Some(1..=5)) {
            return Err(ApiValidationError::InvalidValue {
                field: "priority".to_string(),
                reason: "must be an integer between 1 and 5".to_string(),
            });
        }
    }

    if path == "/validate-payload" {
        if !object["payload"].is_object() {
            return Err(ApiValidationError::InvalidValue {
                field: "payload".to_string(),
                reason: "must be a JSON object".to_string(),
            });
        }
        let valid_list = object["required_fields"]
            .as_array()
            .map(|fields| !fields.is_empty() && fields.iter().all(Value::is_string))
            .unwrap_or(false);
        if !valid_list {
            return Err(ApiValidationError::InvalidValue {
                field: "required_fields".to_string(),
                reason: "must be a non-empty list of field names".to_string(),
            });
        }
    }

    Ok(())
}

fn parse_enum_field<T>(
    object: &serde_json::Map<String, Value>,
    field: &str,
) -> Result<T, ApiValidationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = object
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ApiValidationError::InvalidValue {
            field: field.to_string(),
            reason: "must be a string".to_string(),
        })?;

    raw.parse::<T>().map_err(|err| ApiValidationError::InvalidValue {
        field: field.to_string(),
        reason: err.to_string(),
    })
}

/// Generate middleware config for payload limits.
pub fn payload_limit_config() -> tower_http::limit::RequestBodyLimitLayer {
    tower_http::limit::RequestBodyLimitLayer::new(MAX_PAYLOAD_SIZE)
}
