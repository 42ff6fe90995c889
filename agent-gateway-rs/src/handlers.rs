//! HTTP handlers for the agent endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use payload_validation::ValidationReport;
use shared_types::{
    ActionType, AnalyzedEvent, Classification, Decision, Event, EventCategory, ExecutionResult,
    SeverityLevel,
};

use crate::validation::{validate_request, ValidationErrorResponse};
use crate::{AppState, START_TIME};

type ApiError = (StatusCode, Json<ValidationErrorResponse>);

/// POST /analyze-event - classify a raw event payload.
pub async fn analyze_event(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<Json<Classification>, ApiError> {
    validate_request("/analyze-event", &payload).map_err(|err| err.to_response())?;

    let event: Event = serde_json::from_value(payload)
        .map_err(|err| invalid_format(err.to_string()))?;

    Ok(Json(state.classifier.classify(&event)))
}

/// POST /decide-action - route an analyzed event to an action.
pub async fn decide_action(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<Json<Decision>, ApiError> {
    validate_request("/decide-action", &payload).map_err(|err| err.to_response())?;

    let event: AnalyzedEvent = serde_json::from_value(payload)
        .map_err(|err| invalid_format(err.to_string()))?;

    Ok(Json(state.router.route(&event)))
}

#[derive(Debug, Deserialize)]
struct ExecuteRequest {
    action: ActionType,
    priority: u8,
    event_type: EventCategory,
    severity: SeverityLevel,
    message: String,
    #[serde(default)]
    context: serde_json::Map<String, Value>,
    #[serde(default)]
    metadata: serde_json::Map<String, Value>,
}

/// POST /execute-action - perform a decided action.
pub async fn execute_action(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<Json<ExecutionResult>, ApiError> {
    validate_request("/execute-action", &payload).map_err(|err| err.to_response())?;

    let request: ExecuteRequest = serde_json::from_value(payload)
        .map_err(|err| invalid_format(err.to_string()))?;

    let event = AnalyzedEvent {
        event_type: request.event_type,
        severity: request.severity,
        message: request.message,
        context: request.context,
    };
    let decision = Decision {
        action: request.action,
        priority: request.priority,
        reason: format!("Client-requested {} execution", request.action),
        metadata: request.metadata,
    };

    // Execution failures come back as success=false in the result; the
    // request itself was well-formed, so the status stays success-class.
    Ok(Json(state.executor.execute(&decision, &event)))
}

#[derive(Debug, Deserialize)]
struct ValidatePayloadRequest {
    payload: serde_json::Map<String, Value>,
    required_fields: Vec<String>,
}

/// POST /validate-payload - check a payload for required fields.
pub async fn validate_payload(
    Json(payload): Json<Value>,
) -> Result<Json<ValidationReport>, ApiError> {
    validate_request("/validate-payload", &payload).map_err(|err| err.to_response())?;

    let request: ValidatePayloadRequest = serde_json::from_value(payload)
        .map_err(|err| invalid_format(err.to_string()))?;

    Ok(Json(payload_validation::validate_payload(
        &request.payload,
        &request.required_fields,
    )))
}

/// GET /health - health check endpoint.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "Backend Operations Agent",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": START_TIME.elapsed().as_secs(),
        "endpoints": [
            "/analyze-event",
            "/decide-action",
            "/execute-action",
            "/validate-payload",
            "/health"
        ],
    }))
}

/// GET / - root endpoint.
pub async fn root() -> Json<Value> {
    Json(json!({
        "service": "Backend Operations Agent Gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "GET /health",
            "POST /analyze-event",
            "POST /decide-action",
            "POST /execute-action",
            "POST /validate-payload"
        ],
    }))
}

fn invalid_format(reason: String) -> ApiError {
    crate::validation::ApiValidationError::InvalidFormat(reason).to_response()
}
