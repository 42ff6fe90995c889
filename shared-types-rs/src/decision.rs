//! Classification, routing, and execution records derived from events.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{EventCategory, SeverityLevel};
use crate::ParseError;

/// The four canonical remedial actions. Any other wire string is a
/// configuration error and fails deserialization rather than producing a
/// representable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    LogOnly,
    NotifyAdmin,
    TriggerWorkflow,
    Escalate,
}

impl ActionType {
    pub const ALL: [ActionType; 4] = [
        ActionType::LogOnly,
        ActionType::NotifyAdmin,
        ActionType::TriggerWorkflow,
        ActionType::Escalate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::LogOnly => "log_only",
            ActionType::NotifyAdmin => "notify_admin",
            ActionType::TriggerWorkflow => "trigger_workflow",
            ActionType::Escalate => "escalate",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log_only" => Ok(ActionType::LogOnly),
            "notify_admin" => Ok(ActionType::NotifyAdmin),
            "trigger_workflow" => Ok(ActionType::TriggerWorkflow),
            "escalate" => Ok(ActionType::Escalate),
            other => Err(ParseError::Action(other.to_string())),
        }
    }
}

/// The analysis agent's verdict on a raw event. Derived deterministically
/// and never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub category: EventCategory,
    pub severity: SeverityLevel,
    /// Non-binding hint at the routing outcome for this category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_hint: Option<String>,
    /// Urgency in `1..=5`, 1 most urgent. Always read from the shared
    /// priority table, never computed ad hoc.
    pub priority: u8,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// An event that has already been classified (or arrives pre-classified
/// from an external caller) and is ready for routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedEvent {
    pub event_type: EventCategory,
    pub severity: SeverityLevel,
    pub message: String,
    #[serde(default)]
    pub context: serde_json::Map<String, serde_json::Value>,
}

impl AnalyzedEvent {
    pub fn new<M: Into<String>>(
        event_type: EventCategory,
        severity: SeverityLevel,
        message: M,
    ) -> Self {
        Self {
            event_type,
            severity,
            message: message.into(),
            context: serde_json::Map::new(),
        }
    }

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

/// The orchestrator's chosen remedial action for an analyzed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub action: ActionType,
    pub priority: u8,
    pub reason: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Outcome record produced after attempting a decision's action. Produced
/// exactly once per decision; the executor never retries on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub action: String,
    pub message: String,
    pub execution_time: DateTime<Utc>,
    #[serde(default)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl ExecutionResult {
    /// A successful outcome stamped with the current wall-clock time.
    pub fn success<M: Into<String>>(action: ActionType, message: M) -> Self {
        Self {
            success: true,
            action: action.as_str().to_string(),
            message: message.into(),
            execution_time: Utc::now(),
            details: serde_json::Map::new(),
        }
    }

    /// A failed outcome. Execution failures are values, never panics.
    pub fn failure<M: Into<String>>(action: ActionType, message: M) -> Self {
        Self {
            success: false,
            action: action.as_str().to_string(),
            message: message.into(),
            execution_time: Utc::now(),
            details: serde_json::Map::new(),
        }
    }

    pub fn detail<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Serialize,
    {
        if let Ok(value) = serde_json::to_value(value) {
            self.details.insert(key.into(), value);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_round_trip() {
        for action in ActionType::ALL {
            assert_eq!(action.as_str().parse::<ActionType>().unwrap(), action);
        }
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let err = "alert_security_team".parse::<ActionType>().unwrap_err();
        assert_eq!(err, ParseError::Action("alert_security_team".to_string()));

        // The same holds on the serde path used at the HTTP boundary.
        let parsed: Result<ActionType, _> = serde_json::from_str(r#""reboot_everything""#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_execution_result_preserves_action_identity() {
        for action in ActionType::ALL {
            let result = ExecutionResult::success(action, "done");
            assert_eq!(result.action, action.as_str());
        }
    }

    #[test]
    fn test_execution_result_details() {
        let result = ExecutionResult::failure(ActionType::NotifyAdmin, "no recipients")
            .detail("notifications_sent", 0);
        assert!(!result.success);
        assert_eq!(result.details["notifications_sent"], 0);
    }
}
