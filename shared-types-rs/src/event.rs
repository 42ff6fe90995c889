//! Raw events and their classification vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// A raw backend event: a validation failure, system error, security
/// incident, or captured exception. Built once by a caller or by the
/// exception capture boundary and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Error or event type name, e.g. `ValidationError`. The wire format
    /// accepts either `error_type` or `event_type` for this field.
    #[serde(alias = "event_type")]
    pub error_type: String,
    /// Human-readable description of what happened.
    pub message: String,
    /// Optional stack trace captured at the failure site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    /// Free-form structured context supplied by the event source.
    #[serde(default)]
    pub context: serde_json::Map<String, serde_json::Value>,
}

impl Event {
    pub fn new<S: Into<String>, M: Into<String>>(error_type: S, message: M) -> Self {
        Self {
            error_type: error_type.into(),
            message: message.into(),
            stack_trace: None,
            context: serde_json::Map::new(),
        }
    }

    /// Attaches a stack trace to the event.
    pub fn stack_trace<S: Into<String>>(mut self, trace: S) -> Self {
        self.stack_trace = Some(trace.into());
        self
    }

    /// Adds a context key-value pair.
    pub fn context<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Serialize,
    {
        if let Ok(value) = serde_json::to_value(value) {
            self.context.insert(key.into(), value);
        }
        self
    }
}

/// Classification categories for analyzed events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    ValidationError,
    SystemError,
    SecurityIssue,
    PerformanceIssue,
    Ignorable,
}

impl EventCategory {
    pub const ALL: [EventCategory; 5] = [
        EventCategory::ValidationError,
        EventCategory::SystemError,
        EventCategory::SecurityIssue,
        EventCategory::PerformanceIssue,
        EventCategory::Ignorable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::ValidationError => "validation_error",
            EventCategory::SystemError => "system_error",
            EventCategory::SecurityIssue => "security_issue",
            EventCategory::PerformanceIssue => "performance_issue",
            EventCategory::Ignorable => "ignorable",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "validation_error" => Ok(EventCategory::ValidationError),
            "system_error" => Ok(EventCategory::SystemError),
            "security_issue" => Ok(EventCategory::SecurityIssue),
            "performance_issue" => Ok(EventCategory::PerformanceIssue),
            "ignorable" => Ok(EventCategory::Ignorable),
            other => Err(ParseError::Category(other.to_string())),
        }
    }
}

/// Severity levels, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityLevel {
    pub const ALL: [SeverityLevel; 4] = [
        SeverityLevel::Low,
        SeverityLevel::Medium,
        SeverityLevel::High,
        SeverityLevel::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Low => "low",
            SeverityLevel::Medium => "medium",
            SeverityLevel::High => "high",
            SeverityLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeverityLevel {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(SeverityLevel::Low),
            "medium" => Ok(SeverityLevel::Medium),
            "high" => Ok(SeverityLevel::High),
            "critical" => Ok(SeverityLevel::Critical),
            other => Err(ParseError::Severity(other.to_string())),
        }
    }
}
