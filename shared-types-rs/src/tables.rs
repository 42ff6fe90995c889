//! Static rule tables shared by the analysis and routing agents.
//!
//! The `(category, severity) -> priority` mapping lives here as data so the
//! tie-break order is auditable and testable independently of the keyword
//! matching that selects a category. Read-only after initialization.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::event::{EventCategory, SeverityLevel};

use EventCategory::*;
use SeverityLevel::*;

/// Fixed `(category, severity) -> priority` lookup, 1 = most urgent.
/// Monotonic in severity within each category.
static PRIORITY_TABLE: Lazy<HashMap<(EventCategory, SeverityLevel), u8>> = Lazy::new(|| {
    HashMap::from([
        ((SecurityIssue, Critical), 1),
        ((SecurityIssue, High), 1),
        ((SecurityIssue, Medium), 2),
        ((SecurityIssue, Low), 3),
        ((SystemError, Critical), 1),
        ((SystemError, High), 2),
        ((SystemError, Medium), 3),
        ((SystemError, Low), 4),
        ((PerformanceIssue, Critical), 2),
        ((PerformanceIssue, High), 2),
        ((PerformanceIssue, Medium), 3),
        ((PerformanceIssue, Low), 4),
        ((ValidationError, Critical), 3),
        ((ValidationError, High), 3),
        ((ValidationError, Medium), 4),
        ((ValidationError, Low), 5),
        ((Ignorable, Critical), 5),
        ((Ignorable, High), 5),
        ((Ignorable, Medium), 5),
        ((Ignorable, Low), 5),
    ])
});

/// Workflow entry points by category, used when a decision hands off to an
/// external automation.
static WORKFLOW_TABLE: Lazy<HashMap<EventCategory, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (SystemError, "system_recovery"),
        (PerformanceIssue, "performance_optimization"),
        (SecurityIssue, "security_response"),
    ])
});

/// Looks up the urgency priority for a classified event.
pub fn priority_for(category: EventCategory, severity: SeverityLevel) -> u8 {
    PRIORITY_TABLE.get(&(category, severity)).copied().unwrap_or(5)
}

/// Looks up the workflow entry point for an event category.
pub fn workflow_for(category: EventCategory) -> &'static str {
    WORKFLOW_TABLE.get(&category).copied().unwrap_or("generic_handler")
}
