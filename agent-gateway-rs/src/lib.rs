//! # Agent Gateway
//!
//! HTTP entry point for the backend operations agent pipeline: exposes the
//! classification, routing, execution, and validation endpoints and hosts
//! the exception capture boundary.

pub mod capture;
pub mod handlers;
pub mod validation;

use std::sync::Arc;
use std::time::Instant;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use once_cell::sync::Lazy;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use action_executor::ActionExecutor;
use analysis_agent::Classifier;
use event_router::EventRouter;
use exception_capture::Dispatcher;

/// Track service start time for uptime reporting.
pub static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

/// Shared application state. The pipeline pieces hold no per-request
/// mutable state, so a single instance serves all workers.
pub struct AppState {
    pub classifier: Box<dyn Classifier>,
    pub router: EventRouter,
    pub executor: ActionExecutor,
    pub dispatcher: Arc<Dispatcher>,
}

/// Builds the gateway router with the full middleware stack.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/analyze-event", post(handlers::analyze_event))
        .route("/decide-action", post(handlers::decide_action))
        .route("/execute-action", post(handlers::execute_action))
        .route("/validate-payload", post(handlers::validate_payload))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            capture::capture_exceptions,
        ))
        .layer(validation::payload_limit_config())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
