//! Keyword-matching classifier.
//!
//! Rules are evaluated top-to-bottom with first-match-wins semantics:
//! security, then system, then validation, then performance, then the
//! ignorable default. The ordering is a deliberate tie-break — security
//! indicators must never be shadowed by a coincidental keyword from a
//! lower-precedence rule. Keyword sets are static data tables so the
//! matching surface is auditable in one place.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use shared_types::{priority_for, Classification, Event, EventCategory, SeverityLevel};

use crate::Classifier;

static SECURITY_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "unauthorized",
        "forbidden",
        "authentication",
        "injection",
        "xss",
        "csrf",
        "access denied",
        "permission denied",
    ]
});

// Escalates a security hit from high to critical severity.
static SECURITY_CRITICAL_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec!["injection", "breach", "privilege escalation", "data leak"]
});

static SYSTEM_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "timeout",
        "connection",
        "database",
        "memory",
        "internal server",
        "disk",
    ]
});

// Escalates a system hit from medium to high severity.
static SYSTEM_HIGH_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec!["outage", "unavailable", "crash", "out of memory", "deadlock", "data loss"]
});

static VALIDATION_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec!["invalid", "validation", "required field", "format", "missing field"]
});

static PERFORMANCE_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec!["slow", "latency", "degraded", "response time"]
});

static IP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b").expect("valid IP pattern"));

/// Router-facing action hints per category. Non-binding; the orchestrator's
/// own table is authoritative.
static ACTION_HINTS: Lazy<Vec<(EventCategory, &'static str)>> = Lazy::new(|| {
    vec![
        (EventCategory::SecurityIssue, "escalate"),
        (EventCategory::SystemError, "notify_admin"),
        (EventCategory::PerformanceIssue, "trigger_workflow"),
        (EventCategory::ValidationError, "log_only"),
        (EventCategory::Ignorable, "log_only"),
    ]
});

/// Rule-based classifier over `error_type`, `message`, and `context`.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    fn build(
        &self,
        event: &Event,
        category: EventCategory,
        severity: SeverityLevel,
        matched_rule: &str,
        matched_keyword: Option<&str>,
        reasoning: &str,
    ) -> Classification {
        let mut metadata = serde_json::Map::new();
        metadata.insert("matched_rule".into(), matched_rule.into());
        if let Some(keyword) = matched_keyword {
            metadata.insert("matched_keyword".into(), keyword.into());
        }
        metadata.insert("reasoning".into(), reasoning.into());

        // Surface the offending field for validation errors when the
        // caller supplied one.
        if category == EventCategory::ValidationError {
            if let Some(field) = event.context.get("field") {
                metadata.insert("field".into(), field.clone());
            }
        }

        Classification {
            category,
            severity,
            action_hint: action_hint(category),
            priority: priority_for(category, severity),
            metadata,
        }
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, event: &Event) -> Classification {
        let haystack = build_haystack(event);

        // 1. Security indicators take absolute precedence.
        if let Some(keyword) = first_match(&haystack, &SECURITY_KEYWORDS) {
            let severity = if first_match(&haystack, &SECURITY_CRITICAL_KEYWORDS).is_some() {
                SeverityLevel::Critical
            } else {
                SeverityLevel::High
            };
            tracing::debug!(keyword, "security rule fired");
            return self.build(
                event,
                EventCategory::SecurityIssue,
                severity,
                "security_keywords",
                Some(keyword),
                "Detected security-related keywords in event text",
            );
        }
        if context_is_suspicious(event) {
            return self.build(
                event,
                EventCategory::SecurityIssue,
                SeverityLevel::High,
                "suspicious_context",
                None,
                "Event context carries suspicious security markers",
            );
        }

        // 2. System-level indicators.
        if let Some(keyword) = first_match(&haystack, &SYSTEM_KEYWORDS) {
            let severity = if first_match(&haystack, &SYSTEM_HIGH_KEYWORDS).is_some() {
                SeverityLevel::High
            } else {
                SeverityLevel::Medium
            };
            return self.build(
                event,
                EventCategory::SystemError,
                severity,
                "system_keywords",
                Some(keyword),
                "Detected system-level error indicators",
            );
        }

        // 3. Validation indicators.
        if let Some(keyword) = first_match(&haystack, &VALIDATION_KEYWORDS) {
            return self.build(
                event,
                EventCategory::ValidationError,
                SeverityLevel::Low,
                "validation_keywords",
                Some(keyword),
                "Detected validation-related keywords",
            );
        }

        // 4. Performance indicators.
        if let Some(keyword) = first_match(&haystack, &PERFORMANCE_KEYWORDS) {
            return self.build(
                event,
                EventCategory::PerformanceIssue,
                SeverityLevel::Medium,
                "performance_keywords",
                Some(keyword),
                "Detected performance degradation indicators",
            );
        }

        // 5. Default: nothing notable.
        self.build(
            event,
            EventCategory::Ignorable,
            SeverityLevel::Low,
            "default",
            None,
            "No critical patterns detected",
        )
    }
}

/// Lowercased search text: error type, message, and context string values.
fn build_haystack(event: &Event) -> String {
    let mut haystack = String::with_capacity(event.error_type.len() + event.message.len() + 16);
    haystack.push_str(&event.error_type.to_lowercase());
    haystack.push(' ');
    haystack.push_str(&event.message.to_lowercase());
    for value in event.context.values() {
        if let Value::String(s) = value {
            haystack.push(' ');
            haystack.push_str(&s.to_lowercase());
        }
    }
    haystack
}

fn first_match<'a>(haystack: &str, keywords: &'a [&'static str]) -> Option<&'a str> {
    keywords.iter().find(|kw| haystack.contains(*kw)).copied()
}

/// Suspicious-context markers: a truthy `suspicious` flag, or a
/// `suspicious_ip` entry carrying an IP literal.
fn context_is_suspicious(event: &Event) -> bool {
    if let Some(Value::Bool(true)) = event.context.get("suspicious") {
        return true;
    }
    if let Some(Value::String(ip)) = event.context.get("suspicious_ip") {
        return IP_PATTERN.is_match(ip);
    }
    false
}

fn action_hint(category: EventCategory) -> Option<String> {
    ACTION_HINTS
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, hint)| hint.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(event: Event) -> Classification {
        KeywordClassifier::new().classify(&event)
    }

    #[test]
    fn test_validation_error_scenario() {
        let event = Event::new("ValidationError", "Invalid email format").context("field", "email");
        let verdict = classify(event);

        assert_eq!(verdict.category, EventCategory::ValidationError);
        assert_eq!(verdict.severity, SeverityLevel::Low);
        assert_eq!(verdict.priority, 5);
        assert_eq!(verdict.metadata["field"], "email");
        assert_eq!(verdict.metadata["matched_rule"], "validation_keywords");
    }

    #[test]
    fn test_security_scenario() {
        let event = Event::new("AuthenticationError", "Unauthorized access attempt detected")
            .context("ip_address", "192.168.1.100")
            .context("endpoint", "/admin/users");
        let verdict = classify(event);

        assert_eq!(verdict.category, EventCategory::SecurityIssue);
        assert_eq!(verdict.severity, SeverityLevel::High);
        assert_eq!(verdict.priority, 1);
        assert_eq!(verdict.action_hint.as_deref(), Some("escalate"));
    }

    #[test]
    fn test_security_precedence_over_other_keywords() {
        // "timeout" and "invalid" would match lower-precedence rules; the
        // injection keyword must still win.
        let event = Event::new(
            "RequestError",
            "Invalid input caused SQL injection timeout on database",
        );
        let verdict = classify(event);

        assert_eq!(verdict.category, EventCategory::SecurityIssue);
        assert_eq!(verdict.severity, SeverityLevel::Critical);
        assert_eq!(verdict.priority, 1);
    }

    #[test]
    fn test_suspicious_context_marker() {
        let event = Event::new("AccessLog", "repeated probes against internal endpoints")
            .context("suspicious_ip", "10.0.0.66");
        let verdict = classify(event);

        assert_eq!(verdict.category, EventCategory::SecurityIssue);
        assert_eq!(verdict.metadata["matched_rule"], "suspicious_context");
    }

    #[test]
    fn test_system_error_severity_split() {
        let medium = classify(Event::new("DatabaseError", "Database connection timeout"));
        assert_eq!(medium.category, EventCategory::SystemError);
        assert_eq!(medium.severity, SeverityLevel::Medium);
        assert_eq!(medium.priority, 3);

        let high = classify(Event::new("DatabaseError", "Database crash, service unavailable"));
        assert_eq!(high.category, EventCategory::SystemError);
        assert_eq!(high.severity, SeverityLevel::High);
        assert_eq!(high.priority, 2);
    }

    #[test]
    fn test_performance_rule() {
        let verdict = classify(Event::new(
            "LatencyAlert",
            "API response time exceeds threshold, endpoint degraded",
        ));
        assert_eq!(verdict.category, EventCategory::PerformanceIssue);
        assert_eq!(verdict.severity, SeverityLevel::Medium);
    }

    #[test]
    fn test_default_is_ignorable() {
        let verdict = classify(Event::new("Heartbeat", "worker checked in"));
        assert_eq!(verdict.category, EventCategory::Ignorable);
        assert_eq!(verdict.severity, SeverityLevel::Low);
        assert_eq!(verdict.priority, 5);
        assert_eq!(verdict.metadata["matched_rule"], "default");
    }

    #[test]
    fn test_context_values_are_scanned() {
        let event =
            Event::new("Anomaly", "odd request pattern").context("note", "possible XSS payload");
        let verdict = classify(event);
        assert_eq!(verdict.category, EventCategory::SecurityIssue);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let event = Event::new("DatabaseError", "Database connection timeout");
        let first = classify(event.clone());
        let second = classify(event);
        assert_eq!(first.category, second.category);
        assert_eq!(first.severity, second.severity);
        assert_eq!(first.priority, second.priority);
    }
}
