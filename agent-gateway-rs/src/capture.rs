//! Exception capture middleware.
//!
//! Sits at the edge of request processing: snapshots the request into
//! owned values, runs the inner service with panic isolation, and on an
//! unhandled failure (a panic or a 5xx response) forwards an
//! [`ExceptionContext`] to the analysis dispatcher. The response returned
//! to the original caller is never altered by the dispatch outcome.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::request::Parts;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::FutureExt;
use serde_json::{json, Value};

use exception_capture::{
    capture_body, DispatchMode, ExceptionContext, ExceptionInfo, RequestInfo, ServerInfo, UserInfo,
};

use crate::AppState;

const MODULE: &str = "agent-gateway";

pub async fn capture_exceptions(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.dispatcher.is_enabled() {
        return next.run(request).await;
    }

    let max_body_size = state.dispatcher.config().max_body_size;
    let (parts, body) = request.into_parts();

    // Snapshot everything up front: the request is consumed below and the
    // background dispatch path must own every field it reads.
    let request_info = snapshot_request(&parts);
    let user = parts
        .extensions
        .get::<UserInfo>()
        .cloned()
        .unwrap_or_default();

    let bytes = match axum::body::to_bytes(body, crate::validation::MAX_PAYLOAD_SIZE).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "failed to buffer request body");
            return crate::validation::ApiValidationError::InvalidFormat(
                "failed to read request body".to_string(),
            )
            .to_response()
            .into_response();
        }
    };
    let captured_body = if matches!(parts.method, Method::POST | Method::PUT | Method::PATCH) {
        capture_body(&bytes, max_body_size)
    } else {
        None
    };

    let request = Request::from_parts(parts, Body::from(bytes));

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) if response.status().is_server_error() => {
            let status = response.status();
            let exception = ExceptionInfo::new(
                "InternalServerError",
                format!(
                    "request failed with status {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                ),
                MODULE,
            );
            forward(&state, request_info, captured_body, user, exception).await;
            response
        }
        Ok(response) => response,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!(message = %message, path = %request_info.path, "handler panicked");

            let exception = ExceptionInfo::new("Panic", message, MODULE)
                .traceback(std::backtrace::Backtrace::force_capture().to_string());
            forward(&state, request_info, captured_body, user, exception).await;

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error", "code": 500})),
            )
                .into_response()
        }
    }
}

/// Builds the context and hands it to the dispatcher. Fail-open: every
/// delivery failure resolves inside the dispatcher, so this never errors.
async fn forward(
    state: &Arc<AppState>,
    request: RequestInfo,
    request_body: Option<String>,
    user: UserInfo,
    exception: ExceptionInfo,
) {
    let config = state.dispatcher.config();
    let ctx = ExceptionContext::new(
        config.environment.clone(),
        request,
        request_body,
        user,
        exception,
        ServerInfo {
            hostname: config.hostname.clone(),
            version: config.version.clone(),
        },
    );

    match state.dispatcher.mode() {
        DispatchMode::Blocking => {
            let outcome = state.dispatcher.dispatch(&ctx).await;
            tracing::debug!(?outcome, "blocking capture dispatch finished");
        }
        DispatchMode::Background => state.dispatcher.dispatch_background(ctx),
    }
}

fn snapshot_request(parts: &Parts) -> RequestInfo {
    let mut query_params = serde_json::Map::new();
    if let Some(query) = parts.uri.query() {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            query_params.insert(key.into_owned(), Value::String(value.into_owned()));
        }
    }

    RequestInfo {
        path: parts.uri.path().to_string(),
        method: parts.method.to_string(),
        content_type: header_value(parts, "content-type"),
        query_params,
        remote_addr: remote_addr(parts),
        user_agent: header_value(parts, "user-agent"),
    }
}

/// Client address, preferring the forwarded header over the socket peer.
fn remote_addr(parts: &Parts) -> String {
    if let Some(forwarded) = parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    parts
        .extensions
        .get::<ConnectInfo<std::net::SocketAddr>>()
        .map(|info| info.0.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn header_value(parts: &Parts, name: &str) -> String {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unhandled panic".to_string()
    }
}
