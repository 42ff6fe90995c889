//! # Shared Agent Types
//!
//! Cross-crate data model for the backend operations agent stack: raw
//! events, classification verdicts, routing decisions, execution results,
//! and the static rule tables they share.

pub mod decision;
pub mod event;
pub mod tables;

pub use decision::{ActionType, AnalyzedEvent, Classification, Decision, ExecutionResult};
pub use event::{Event, EventCategory, SeverityLevel};
pub use tables::{priority_for, workflow_for};

/// Parse failure for one of the wire-level enums.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown event category: {0}")]
    Category(String),

    #[error("unknown severity level: {0}")]
    Severity(String),

    #[error("unknown action type: {0}")]
    Action(String),
}
