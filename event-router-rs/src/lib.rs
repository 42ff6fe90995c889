//! # Event Router
//!
//! The orchestrator agent: maps an analyzed event's `(category, severity)`
//! pair to a remedial action through an explicit rule table. The table is
//! data, not a branching cascade, so overrides and tie-breaks stay
//! auditable.

pub mod rules;

use std::collections::{HashMap, HashSet};

use serde_json::{json, Value};

use shared_types::{
    workflow_for, ActionType, AnalyzedEvent, Decision, EventCategory, ParseError, SeverityLevel,
};

pub use rules::parse_action;

/// Routing failure at the string boundary.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Routes analyzed events to actions based on type and severity.
#[derive(Debug, Clone)]
pub struct EventRouter {
    rules: HashMap<(EventCategory, SeverityLevel), (ActionType, u8)>,
    workflow_registry: HashSet<EventCategory>,
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRouter {
    /// Router with the default rule table and an empty workflow registry.
    pub fn new() -> Self {
        Self {
            rules: rules::ROUTING_TABLE.clone(),
            workflow_registry: HashSet::new(),
        }
    }

    /// Router with custom rule overrides applied on top of the defaults.
    ///
    /// Expected shape: `{event_type: {severity: [action, priority]}}` (an
    /// `{"action": .., "priority": ..}` object is also accepted). Invalid
    /// entries are logged and skipped, never installed.
    pub fn with_rules(custom: &Value) -> Self {
        let mut router = Self::new();
        router.apply_custom_rules(custom);
        router
    }

    /// Marks an event category as having an automatable remediation
    /// registered, enabling the notify-to-workflow upgrade.
    pub fn register_workflow(&mut self, category: EventCategory) {
        self.workflow_registry.insert(category);
    }

    /// Applies custom rule overrides. Unknown categories, severities,
    /// actions, or out-of-range priorities are rejected with a warning;
    /// the default entry stays in place.
    pub fn apply_custom_rules(&mut self, custom: &Value) {
        let Some(by_category) = custom.as_object() else {
            tracing::warn!("custom routing rules must be an object, ignoring");
            return;
        };

        for (category_str, severity_rules) in by_category {
            let Ok(category) = category_str.parse::<EventCategory>() else {
                tracing::warn!(category = %category_str, "skipping custom rule: unknown event type");
                continue;
            };
            let Some(severity_rules) = severity_rules.as_object() else {
                tracing::warn!(category = %category_str, "skipping custom rule: expected severity map");
                continue;
            };

            for (severity_str, rule) in severity_rules {
                let Ok(severity) = severity_str.parse::<SeverityLevel>() else {
                    tracing::warn!(severity = %severity_str, "skipping custom rule: unknown severity");
                    continue;
                };
                match parse_rule(rule) {
                    Ok((action, priority)) => {
                        self.rules.insert((category, severity), (action, priority));
                    }
                    Err(reason) => {
                        tracing::warn!(
                            category = %category_str,
                            severity = %severity_str,
                            %reason,
                            "skipping invalid custom rule"
                        );
                    }
                }
            }
        }
    }

    /// Routes an analyzed event to the appropriate action.
    pub fn route(&self, event: &AnalyzedEvent) -> Decision {
        let (action, priority) = self
            .rules
            .get(&(event.event_type, event.severity))
            .copied()
            .unwrap_or((ActionType::LogOnly, 5));

        // Upgrade a notification to an automated workflow when a
        // remediation is registered for this event type and the severity
        // warrants it.
        let action = if action == ActionType::NotifyAdmin
            && matches!(event.severity, SeverityLevel::Medium | SeverityLevel::High)
            && self.automation_registered(event)
        {
            ActionType::TriggerWorkflow
        } else {
            action
        };

        Decision {
            action,
            priority,
            reason: reason_for(event, action),
            metadata: build_metadata(event, action, priority),
        }
    }

    /// Active rule table keyed by category and severity, for inspection.
    pub fn routing_summary(&self) -> Value {
        let mut summary = serde_json::Map::new();
        for category in EventCategory::ALL {
            let mut by_severity = serde_json::Map::new();
            for severity in SeverityLevel::ALL {
                if let Some((action, priority)) = self.rules.get(&(category, severity)) {
                    by_severity.insert(
                        severity.as_str().to_string(),
                        json!({"action": action.as_str(), "priority": priority}),
                    );
                }
            }
            summary.insert(category.as_str().to_string(), Value::Object(by_severity));
        }
        Value::Object(summary)
    }

    fn automation_registered(&self, event: &AnalyzedEvent) -> bool {
        if self.workflow_registry.contains(&event.event_type) {
            return true;
        }
        matches!(
            event.context.get("automation_registered"),
            Some(Value::Bool(true))
        )
    }
}

/// Routes an event given as wire strings without building a router first.
pub fn route_event(
    event_type: &str,
    severity: &str,
    message: &str,
    context: Option<serde_json::Map<String, Value>>,
) -> Result<Decision, RouterError> {
    let event = AnalyzedEvent {
        event_type: event_type.parse()?,
        severity: severity.parse()?,
        message: message.to_string(),
        context: context.unwrap_or_default(),
    };
    Ok(EventRouter::new().route(&event))
}

fn parse_rule(rule: &Value) -> Result<(ActionType, u8), String> {
    let (action_value, priority_value) = match rule {
        Value::Array(pair) if pair.len() == 2 => (&pair[0], &pair[1]),
        Value::Object(obj) => match (obj.get("action"), obj.get("priority")) {
            (Some(action), Some(priority)) => (action, priority),
            _ => return Err("rule object needs action and priority".to_string()),
        },
        _ => return Err("rule must be [action, priority]".to_string()),
    };

    let action = action_value
        .as_str()
        .ok_or_else(|| "action must be a string".to_string())
        .and_then(|name| parse_action(name).map_err(|e| e.to_string()))?;

    let priority = priority_value
        .as_u64()
        .filter(|p| (1..=5u64).contains(p))
        .ok_or_else(|| "priority must be in 1..=5".to_string())? as u8;

    Ok((action, priority))
}

fn reason_for(event: &AnalyzedEvent, action: ActionType) -> String {
    match action {
        ActionType::LogOnly => format!(
            "Event classified as {} with {} severity - logging for record keeping",
            event.event_type, event.severity
        ),
        ActionType::NotifyAdmin => format!(
            "Event requires admin attention: {} with {} severity",
            event.event_type, event.severity
        ),
        ActionType::TriggerWorkflow => format!(
            "Event triggers automated workflow: {} with {} severity",
            event.event_type, event.severity
        ),
        ActionType::Escalate => format!(
            "Critical event requiring immediate escalation: {} with {} severity",
            event.event_type, event.severity
        ),
    }
}

fn build_metadata(
    event: &AnalyzedEvent,
    action: ActionType,
    priority: u8,
) -> serde_json::Map<String, Value> {
    let mut metadata = serde_json::Map::new();
    metadata.insert("event_type".into(), event.event_type.as_str().into());
    metadata.insert("severity".into(), event.severity.as_str().into());
    metadata.insert("message".into(), event.message.clone().into());
    metadata.insert("requires_immediate_action".into(), (priority <= 2).into());
    metadata.insert(
        "user_facing".into(),
        (event.event_type == EventCategory::ValidationError).into(),
    );

    match action {
        ActionType::Escalate => {
            metadata.insert("escalation_level".into(), "immediate".into());
            metadata.insert("notify_channels".into(), json!(["email", "sms", "slack"]));
        }
        ActionType::NotifyAdmin => {
            metadata.insert("notify_channels".into(), json!(["email", "slack"]));
        }
        ActionType::TriggerWorkflow => {
            metadata.insert("workflow_type".into(), workflow_for(event.event_type).into());
        }
        ActionType::LogOnly => {}
    }

    metadata.insert("original_context".into(), Value::Object(event.context.clone()));
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(
        event_type: EventCategory,
        severity: SeverityLevel,
        message: &str,
    ) -> AnalyzedEvent {
        AnalyzedEvent::new(event_type, severity, message)
    }

    #[test]
    fn test_security_high_escalates() {
        let decision = EventRouter::new().route(&event(
            EventCategory::SecurityIssue,
            SeverityLevel::High,
            "Unauthorized access attempt",
        ));

        assert_eq!(decision.action, ActionType::Escalate);
        assert_eq!(decision.priority, 1);
        assert_eq!(decision.metadata["requires_immediate_action"], true);
        assert_eq!(decision.metadata["escalation_level"], "immediate");
        assert!(decision.reason.contains("immediate escalation"));
    }

    #[test]
    fn test_medium_system_error_notifies() {
        let decision = EventRouter::new().route(&event(
            EventCategory::SystemError,
            SeverityLevel::Medium,
            "Database connection timeout",
        ));

        assert_eq!(decision.action, ActionType::NotifyAdmin);
        assert_eq!(decision.priority, 3);
        assert_eq!(decision.metadata["requires_immediate_action"], false);
        assert_eq!(decision.metadata["notify_channels"], json!(["email", "slack"]));
    }

    #[test]
    fn test_high_system_error_triggers_workflow() {
        let decision = EventRouter::new().route(&event(
            EventCategory::SystemError,
            SeverityLevel::High,
            "Service crash",
        ));

        assert_eq!(decision.action, ActionType::TriggerWorkflow);
        assert_eq!(decision.priority, 2);
        assert_eq!(decision.metadata["workflow_type"], "system_recovery");
        assert_eq!(decision.metadata["requires_immediate_action"], true);
    }

    #[test]
    fn test_low_validation_error_logs_only() {
        let decision = EventRouter::new().route(&event(
            EventCategory::ValidationError,
            SeverityLevel::Low,
            "Invalid email format",
        ));

        assert_eq!(decision.action, ActionType::LogOnly);
        assert_eq!(decision.priority, 5);
        assert_eq!(decision.metadata["user_facing"], true);
    }

    #[test]
    fn test_workflow_upgrade_via_registry() {
        let mut router = EventRouter::new();
        router.register_workflow(EventCategory::SystemError);

        let decision = router.route(&event(
            EventCategory::SystemError,
            SeverityLevel::Medium,
            "Database connection timeout",
        ));

        // Action upgrades; the table priority is untouched.
        assert_eq!(decision.action, ActionType::TriggerWorkflow);
        assert_eq!(decision.priority, 3);
        assert_eq!(decision.metadata["workflow_type"], "system_recovery");
    }

    #[test]
    fn test_workflow_upgrade_via_context_marker() {
        let analyzed = event(
            EventCategory::SecurityIssue,
            SeverityLevel::Medium,
            "repeated login failures",
        )
        .context("automation_registered", true);

        let decision = EventRouter::new().route(&analyzed);
        assert_eq!(decision.action, ActionType::TriggerWorkflow);
        assert_eq!(decision.metadata["workflow_type"], "security_response");
    }

    #[test]
    fn test_no_upgrade_at_low_severity() {
        let mut router = EventRouter::new();
        router.register_workflow(EventCategory::SecurityIssue);

        let decision = router.route(&event(
            EventCategory::SecurityIssue,
            SeverityLevel::Low,
            "odd login time",
        ));
        assert_eq!(decision.action, ActionType::NotifyAdmin);
    }

    #[test]
    fn test_custom_rules_override_defaults() {
        let router = EventRouter::with_rules(&json!({
            "validation_error": {"high": ["notify_admin", 2]}
        }));

        let decision = router.route(&event(
            EventCategory::ValidationError,
            SeverityLevel::High,
            "Critical validation failure",
        ));

        assert_eq!(decision.action, ActionType::NotifyAdmin);
        assert_eq!(decision.priority, 2);
    }

    #[test]
    fn test_custom_rules_accept_legacy_aliases() {
        let router = EventRouter::with_rules(&json!({
            "system_error": {"medium": ["log_and_monitor", 3]}
        }));

        let decision = router.route(&event(
            EventCategory::SystemError,
            SeverityLevel::Medium,
            "Database connection timeout",
        ));
        assert_eq!(decision.action, ActionType::NotifyAdmin);
    }

    #[test]
    fn test_invalid_custom_rules_are_skipped() {
        let router = EventRouter::with_rules(&json!({
            "not_a_category": {"high": ["escalate", 1]},
            "system_error": {
                "not_a_severity": ["escalate", 1],
                "medium": ["reboot_everything", 1],
                "low": ["escalate", 9]
            }
        }));

        // Every invalid entry is rejected; defaults stay in force.
        let decision = router.route(&event(
            EventCategory::SystemError,
            SeverityLevel::Medium,
            "Database connection timeout",
        ));
        assert_eq!(decision.action, ActionType::NotifyAdmin);
        assert_eq!(decision.priority, 3);

        let low = router.route(&event(EventCategory::SystemError, SeverityLevel::Low, "blip"));
        assert_eq!(low.action, ActionType::LogOnly);
        assert_eq!(low.priority, 4);
    }

    #[test]
    fn test_route_event_convenience() {
        let decision =
            route_event("system_error", "critical", "Service unavailable", None).unwrap();
        assert_eq!(decision.action, ActionType::Escalate);
        assert_eq!(decision.priority, 1);

        assert!(route_event("bogus", "critical", "x", None).is_err());
    }

    #[test]
    fn test_routing_summary_shape() {
        let summary = EventRouter::new().routing_summary();
        assert_eq!(summary["security_issue"]["high"]["action"], "escalate");
        assert_eq!(summary["security_issue"]["high"]["priority"], 1);
        assert_eq!(summary["ignorable"]["critical"]["action"], "log_only");
    }

    #[test]
    fn test_metadata_echoes_original_context() {
        let analyzed = event(EventCategory::SystemError, SeverityLevel::Medium, "timeout")
            .context("database", "postgres");
        let decision = EventRouter::new().route(&analyzed);
        assert_eq!(decision.metadata["original_context"]["database"], "postgres");
    }
}
