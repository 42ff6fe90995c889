//! Default routing rules and custom-rule parsing.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use shared_types::{ActionType, EventCategory, ParseError, SeverityLevel};

use ActionType::*;
use EventCategory::*;
use SeverityLevel::*;

/// Default `(category, severity) -> (action, priority)` routing table.
/// Priorities agree with `shared_types::priority_for` for every pair.
pub(crate) static ROUTING_TABLE: Lazy<HashMap<(EventCategory, SeverityLevel), (ActionType, u8)>> =
    Lazy::new(|| {
        HashMap::from([
            // Security issues - always high priority
            ((SecurityIssue, Critical), (Escalate, 1)),
            ((SecurityIssue, High), (Escalate, 1)),
            ((SecurityIssue, Medium), (NotifyAdmin, 2)),
            ((SecurityIssue, Low), (NotifyAdmin, 3)),
            // System errors - priority tracks severity
            ((SystemError, Critical), (Escalate, 1)),
            ((SystemError, High), (TriggerWorkflow, 2)),
            ((SystemError, Medium), (NotifyAdmin, 3)),
            ((SystemError, Low), (LogOnly, 4)),
            // Performance issues - automate or notify
            ((PerformanceIssue, Critical), (TriggerWorkflow, 2)),
            ((PerformanceIssue, High), (TriggerWorkflow, 2)),
            ((PerformanceIssue, Medium), (NotifyAdmin, 3)),
            ((PerformanceIssue, Low), (LogOnly, 4)),
            // Validation errors - usually just log
            ((ValidationError, Critical), (NotifyAdmin, 3)),
            ((ValidationError, High), (NotifyAdmin, 3)),
            ((ValidationError, Medium), (LogOnly, 4)),
            ((ValidationError, Low), (LogOnly, 5)),
            // Ignorable events - always just log
            ((Ignorable, Critical), (LogOnly, 5)),
            ((Ignorable, High), (LogOnly, 5)),
            ((Ignorable, Medium), (LogOnly, 5)),
            ((Ignorable, Low), (LogOnly, 5)),
        ])
    });

/// Parses an action name, reconciling the legacy vocabulary onto the
/// canonical four-action enum. Aliases are accepted only here, at the
/// custom-rule boundary; they are never a representable state.
pub fn parse_action(name: &str) -> Result<ActionType, ParseError> {
    match name {
        "alert_security_team" => Ok(Escalate),
        "log_and_monitor" => Ok(NotifyAdmin),
        "return_validation_error" => Ok(LogOnly),
        canonical => canonical.parse(),
    }
}
