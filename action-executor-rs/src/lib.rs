//! # Action Executor
//!
//! Performs the side effect named by a routing decision and reports the
//! outcome as a value. The executor never raises to its caller: every
//! failure mode, including misconfiguration, is represented in the
//! returned [`ExecutionResult`].

pub mod channels;

use serde_json::json;

use shared_types::{workflow_for, ActionType, AnalyzedEvent, Decision, ExecutionResult};

pub use channels::{
    ChannelError, LogChannel, LogWorkflowLauncher, NotificationChannel, WorkflowLauncher,
};

/// Executor configuration: recipient sets for the notification channels.
#[derive(Debug, Clone, Default)]
pub struct ExecutorConfig {
    pub admin_recipients: Vec<String>,
    pub pager_targets: Vec<String>,
}

impl ExecutorConfig {
    /// Loads recipients from `AGENT_ADMIN_RECIPIENTS` and
    /// `AGENT_PAGER_TARGETS` (comma-separated).
    pub fn from_env() -> Self {
        Self {
            admin_recipients: config_rs::env_list("AGENT_ADMIN_RECIPIENTS"),
            pager_targets: config_rs::env_list("AGENT_PAGER_TARGETS"),
        }
    }
}

/// Executes decisions against pluggable notification/workflow seams.
pub struct ActionExecutor {
    config: ExecutorConfig,
    admin_channel: Box<dyn NotificationChannel>,
    pager_channel: Box<dyn NotificationChannel>,
    launcher: Box<dyn WorkflowLauncher>,
}

impl ActionExecutor {
    /// Executor with the built-in log-backed channels.
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            admin_channel: Box::new(LogChannel::new("email")),
            pager_channel: Box::new(LogChannel::new("pager")),
            launcher: Box::new(LogWorkflowLauncher),
        }
    }

    /// Executor with caller-supplied transports.
    pub fn with_channels(
        config: ExecutorConfig,
        admin_channel: Box<dyn NotificationChannel>,
        pager_channel: Box<dyn NotificationChannel>,
        launcher: Box<dyn WorkflowLauncher>,
    ) -> Self {
        Self {
            config,
            admin_channel,
            pager_channel,
            launcher,
        }
    }

    /// Performs the decision's action. `execution_time` on the result is
    /// the wall-clock timestamp at completion.
    pub fn execute(&self, decision: &Decision, event: &AnalyzedEvent) -> ExecutionResult {
        metrics::counter!("actions.executed.total", 1);
        let action_label = format!("actions.executed.{}", decision.action);
        metrics::counter!(action_label, 1);

        let result = match decision.action {
            ActionType::LogOnly => self.log_only(decision, event),
            ActionType::NotifyAdmin => self.notify_admin(decision, event),
            ActionType::TriggerWorkflow => self.trigger_workflow(decision, event),
            ActionType::Escalate => self.escalate(decision, event),
        };

        if !result.success {
            metrics::counter!("actions.failed", 1);
        }
        result
    }

    fn log_only(&self, decision: &Decision, event: &AnalyzedEvent) -> ExecutionResult {
        // Log level tracks urgency so record-keeping entries stay quiet.
        let log_level = match decision.priority {
            1 | 2 => {
                tracing::error!(
                    event_type = %event.event_type,
                    severity = %event.severity,
                    priority = decision.priority,
                    message = %event.message,
                    "event logged"
                );
                "ERROR"
            }
            3 => {
                tracing::warn!(
                    event_type = %event.event_type,
                    severity = %event.severity,
                    priority = decision.priority,
                    message = %event.message,
                    "event logged"
                );
                "WARN"
            }
            _ => {
                tracing::info!(
                    event_type = %event.event_type,
                    severity = %event.severity,
                    priority = decision.priority,
                    message = %event.message,
                    "event logged"
                );
                "INFO"
            }
        };

        ExecutionResult::success(ActionType::LogOnly, "Event logged successfully")
            .detail("log_level", log_level)
    }

    fn notify_admin(&self, decision: &Decision, event: &AnalyzedEvent) -> ExecutionResult {
        if self.config.admin_recipients.is_empty() {
            // Misconfiguration is an execution-side failure, not an error:
            // the request itself was well-formed.
            return ExecutionResult::failure(
                ActionType::NotifyAdmin,
                "No admin recipients configured",
            )
            .detail("notifications_sent", 0);
        }

        let (sent, failed) = self.deliver_to_all(
            self.admin_channel.as_ref(),
            &self.config.admin_recipients,
            decision,
            event,
        );

        if sent == 0 {
            return ExecutionResult::failure(
                ActionType::NotifyAdmin,
                "Admin notification failed for every recipient",
            )
            .detail("notifications_sent", 0)
            .detail("failed_recipients", failed);
        }

        ExecutionResult::success(ActionType::NotifyAdmin, "Admin notification sent")
            .detail("notifications_sent", sent)
            .detail("failed_recipients", failed)
    }

    fn trigger_workflow(&self, decision: &Decision, event: &AnalyzedEvent) -> ExecutionResult {
        let workflow_type = decision
            .metadata
            .get("workflow_type")
            .and_then(|v| v.as_str())
            .unwrap_or_else(|| workflow_for(event.event_type))
            .to_string();

        match self.launcher.launch(&workflow_type, event) {
            Ok(()) => ExecutionResult::success(
                ActionType::TriggerWorkflow,
                format!("Workflow triggered: {}", workflow_type),
            )
            .detail("workflow_type", workflow_type),
            Err(err) => ExecutionResult::failure(ActionType::TriggerWorkflow, err.to_string())
                .detail("workflow_type", workflow_type),
        }
    }

    fn escalate(&self, decision: &Decision, event: &AnalyzedEvent) -> ExecutionResult {
        let (admin_sent, admin_failed) = self.deliver_to_all(
            self.admin_channel.as_ref(),
            &self.config.admin_recipients,
            decision,
            event,
        );
        let (pager_sent, pager_failed) = self.deliver_to_all(
            self.pager_channel.as_ref(),
            &self.config.pager_targets,
            decision,
            event,
        );

        let channels = json!({
            "admin": {
                "configured": self.config.admin_recipients.len(),
                "delivered": admin_sent,
                "failed": admin_failed,
            },
            "pager": {
                "configured": self.config.pager_targets.len(),
                "delivered": pager_sent,
                "failed": pager_failed,
            },
        });

        // Partial failure still counts as escalated as long as one channel
        // got the message out.
        if admin_sent + pager_sent == 0 {
            return ExecutionResult::failure(
                ActionType::Escalate,
                "Escalation failed: no channel delivered",
            )
            .detail("escalation_level", "critical")
            .detail("channels", channels)
            .detail("notifications_sent", 0);
        }

        tracing::error!(
            event_type = %event.event_type,
            severity = %event.severity,
            priority = decision.priority,
            "escalation initiated"
        );

        ExecutionResult::success(ActionType::Escalate, "Critical escalation initiated")
            .detail("escalation_level", "critical")
            .detail("channels", channels)
            .detail("notifications_sent", admin_sent + pager_sent)
    }

    fn deliver_to_all(
        &self,
        channel: &dyn NotificationChannel,
        recipients: &[String],
        decision: &Decision,
        event: &AnalyzedEvent,
    ) -> (usize, Vec<String>) {
        let subject = format!("[agent] {} ({})", event.event_type, event.severity);
        let mut sent = 0;
        let mut failed = Vec::new();

        for recipient in recipients {
            match channel.deliver(recipient, &subject, &decision.reason) {
                Ok(()) => sent += 1,
                Err(err) => {
                    tracing::warn!(
                        channel = channel.name(),
                        recipient = %recipient,
                        error = %err,
                        "notification delivery failed"
                    );
                    failed.push(recipient.clone());
                }
            }
        }

        (sent, failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{EventCategory, SeverityLevel};

    struct FailingChannel;

    impl NotificationChannel for FailingChannel {
        fn name(&self) -> &str {
            "failing"
        }

        fn deliver(&self, recipient: &str, _: &str, _: &str) -> Result<(), ChannelError> {
            Err(ChannelError::Delivery {
                channel: "failing".to_string(),
                reason: format!("unreachable transport for {recipient}"),
            })
        }
    }

    struct RejectingLauncher;

    impl WorkflowLauncher for RejectingLauncher {
        fn launch(&self, workflow_type: &str, _: &AnalyzedEvent) -> Result<(), ChannelError> {
            Err(ChannelError::HandoffRejected {
                workflow: workflow_type.to_string(),
                reason: "queue full".to_string(),
            })
        }
    }

    fn decision(action: ActionType, priority: u8) -> Decision {
        Decision {
            action,
            priority,
            reason: "test decision".to_string(),
            metadata: serde_json::Map::new(),
        }
    }

    fn event() -> AnalyzedEvent {
        AnalyzedEvent::new(
            EventCategory::SystemError,
            SeverityLevel::Medium,
            "Database connection timeout",
        )
    }

    fn configured() -> ExecutorConfig {
        ExecutorConfig {
            admin_recipients: vec!["ops@example.com".to_string(), "sre@example.com".to_string()],
            pager_targets: vec!["oncall-primary".to_string()],
        }
    }

    #[test]
    fn test_action_identity_is_preserved() {
        let executor = ActionExecutor::new(configured());
        for action in ActionType::ALL {
            let result = executor.execute(&decision(action, 3), &event());
            assert_eq!(result.action, action.as_str());
        }
    }

    #[test]
    fn test_log_only_always_succeeds() {
        let executor = ActionExecutor::new(ExecutorConfig::default());
        let result = executor.execute(&decision(ActionType::LogOnly, 5), &event());

        assert!(result.success);
        assert_eq!(result.details["log_level"], "INFO");

        let urgent = executor.execute(&decision(ActionType::LogOnly, 1), &event());
        assert_eq!(urgent.details["log_level"], "ERROR");
    }

    #[test]
    fn test_notify_admin_without_recipients_fails_softly() {
        let executor = ActionExecutor::new(ExecutorConfig::default());
        let result = executor.execute(&decision(ActionType::NotifyAdmin, 2), &event());

        assert!(!result.success);
        assert_eq!(result.action, "notify_admin");
        assert_eq!(result.details["notifications_sent"], 0);
        assert!(result.message.contains("No admin recipients"));
    }

    #[test]
    fn test_notify_admin_counts_deliveries() {
        let executor = ActionExecutor::new(configured());
        let result = executor.execute(&decision(ActionType::NotifyAdmin, 2), &event());

        assert!(result.success);
        assert_eq!(result.details["notifications_sent"], 2);
    }

    #[test]
    fn test_notify_admin_all_deliveries_failing() {
        let executor = ActionExecutor::with_channels(
            configured(),
            Box::new(FailingChannel),
            Box::new(LogChannel::new("pager")),
            Box::new(LogWorkflowLauncher),
        );
        let result = executor.execute(&decision(ActionType::NotifyAdmin, 2), &event());

        assert!(!result.success);
        assert_eq!(result.details["notifications_sent"], 0);
        assert_eq!(result.details["failed_recipients"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_trigger_workflow_uses_metadata_type() {
        let executor = ActionExecutor::new(configured());
        let mut with_type = decision(ActionType::TriggerWorkflow, 2);
        with_type
            .metadata
            .insert("workflow_type".into(), "system_recovery".into());

        let result = executor.execute(&with_type, &event());
        assert!(result.success);
        assert_eq!(result.details["workflow_type"], "system_recovery");
        assert!(result.message.contains("system_recovery"));
    }

    #[test]
    fn test_trigger_workflow_falls_back_to_category_table() {
        let executor = ActionExecutor::new(configured());
        let result = executor.execute(&decision(ActionType::TriggerWorkflow, 2), &event());
        assert_eq!(result.details["workflow_type"], "system_recovery");
    }

    #[test]
    fn test_trigger_workflow_rejected_handoff() {
        let executor = ActionExecutor::with_channels(
            configured(),
            Box::new(LogChannel::new("email")),
            Box::new(LogChannel::new("pager")),
            Box::new(RejectingLauncher),
        );
        let result = executor.execute(&decision(ActionType::TriggerWorkflow, 2), &event());

        assert!(!result.success);
        assert!(result.message.contains("queue full"));
    }

    #[test]
    fn test_escalate_partial_failure_still_succeeds() {
        // Admin channel down, pager up: escalation still counts.
        let executor = ActionExecutor::with_channels(
            configured(),
            Box::new(FailingChannel),
            Box::new(LogChannel::new("pager")),
            Box::new(LogWorkflowLauncher),
        );
        let result = executor.execute(&decision(ActionType::Escalate, 1), &event());

        assert!(result.success);
        assert_eq!(result.details["channels"]["admin"]["delivered"], 0);
        assert_eq!(result.details["channels"]["pager"]["delivered"], 1);
        assert_eq!(result.details["notifications_sent"], 1);
    }

    #[test]
    fn test_escalate_total_failure() {
        let executor = ActionExecutor::with_channels(
            configured(),
            Box::new(FailingChannel),
            Box::new(FailingChannel),
            Box::new(LogWorkflowLauncher),
        );
        let result = executor.execute(&decision(ActionType::Escalate, 1), &event());

        assert!(!result.success);
        assert_eq!(result.details["notifications_sent"], 0);
    }

    #[test]
    fn test_escalate_with_nothing_configured() {
        let executor = ActionExecutor::new(ExecutorConfig::default());
        let result = executor.execute(&decision(ActionType::Escalate, 1), &event());

        assert!(!result.success);
        assert_eq!(result.details["channels"]["admin"]["configured"], 0);
    }
}
