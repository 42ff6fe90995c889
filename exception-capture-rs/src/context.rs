//! Structured snapshot of an unhandled request failure.
//!
//! Every field is copied into owned values at capture time: the snapshot
//! must outlive the request that produced it, including across a hand-off
//! to a background dispatch task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request metadata copied out of the failing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestInfo {
    pub path: String,
    pub method: String,
    pub content_type: String,
    #[serde(default)]
    pub query_params: serde_json::Map<String, serde_json::Value>,
    pub remote_addr: String,
    pub user_agent: String,
}

/// Authenticated-user snapshot. Anonymous when the request carried no
/// identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserInfo {
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            id: None,
            username: None,
            email: None,
        }
    }
}

impl Default for UserInfo {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// Details of the failure itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub module: String,
    pub traceback: String,
    #[serde(default)]
    pub traceback_list: Vec<String>,
}

impl ExceptionInfo {
    pub fn new<K: Into<String>, M: Into<String>>(kind: K, message: M, module: &str) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            module: module.to_string(),
            traceback: String::new(),
            traceback_list: Vec::new(),
        }
    }

    pub fn traceback<S: Into<String>>(mut self, traceback: S) -> Self {
        let traceback = traceback.into();
        self.traceback_list = traceback.lines().map(str::to_string).collect();
        self.traceback = traceback;
        self
    }
}

/// Identity of the server that captured the failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub hostname: String,
    pub version: String,
}

/// The complete exception snapshot sent to the analysis service. Built
/// once per captured failure; size-bounded via the request-body cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionContext {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
    pub request: RequestInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<String>,
    pub user: UserInfo,
    pub exception: ExceptionInfo,
    pub server: ServerInfo,
}

impl ExceptionContext {
    pub fn new(
        environment: String,
        request: RequestInfo,
        request_body: Option<String>,
        user: UserInfo,
        exception: ExceptionInfo,
        server: ServerInfo,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            environment,
            request,
            request_body,
            user,
            exception,
            server,
        }
    }
}

/// Caps a captured request body. Oversized bodies are replaced with a
/// marker rather than truncated so the cap is visible downstream.
pub fn capture_body(body: &[u8], max_body_size: usize) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    if body.len() > max_body_size {
        return Some(format!("[Body too large: {} bytes]", body.len()));
    }
    Some(String::from_utf8_lossy(body).into_owned())
}
