//! # Exception Capture
//!
//! Captures structured context for unhandled request failures and forwards
//! it to an external analysis endpoint, fail-open: a slow or unavailable
//! analysis service never alters the response the original caller sees.
//!
//! A capture moves through `Idle -> CapturingContext -> Dispatching` and
//! terminates as either `Delivered` or `Suppressed`. Two dispatch
//! disciplines are supported: blocking (bounded by the configured timeout)
//! and background (handed to an independent task with an owned snapshot).

pub mod config;
pub mod context;
pub mod dispatch;

pub use config::{CaptureConfig, DispatchMode};
pub use context::{
    capture_body, ExceptionContext, ExceptionInfo, RequestInfo, ServerInfo, UserInfo,
};
pub use dispatch::{CaptureError, DispatchOutcome, Dispatcher};
