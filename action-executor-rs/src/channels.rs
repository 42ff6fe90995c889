//! Delivery seams for notification and workflow side effects.
//!
//! Real transports (SMTP, paging providers, workflow engines) are external
//! collaborators; the built-in implementations write structured log records
//! so the executor stays side-effect-scoped to a single call.

use shared_types::AnalyzedEvent;

/// Delivery failure from a notification channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("delivery failed on channel {channel}: {reason}")]
    Delivery { channel: String, reason: String },

    #[error("workflow handoff rejected for {workflow}: {reason}")]
    HandoffRejected { workflow: String, reason: String },
}

/// A single notification transport (email, chat, pager, ...).
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &str;

    /// Delivers one message to one recipient. Failure is a value; the
    /// executor decides how partial failures aggregate.
    fn deliver(&self, recipient: &str, subject: &str, body: &str) -> Result<(), ChannelError>;
}

/// Entry point that accepts workflow handoffs. Success means the handoff
/// was accepted, not that the workflow completed.
pub trait WorkflowLauncher: Send + Sync {
    fn launch(&self, workflow_type: &str, event: &AnalyzedEvent) -> Result<(), ChannelError>;
}

/// Notification channel that records deliveries as structured logs.
#[derive(Debug, Clone)]
pub struct LogChannel {
    name: String,
}

impl LogChannel {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into() }
    }
}

impl NotificationChannel for LogChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn deliver(&self, recipient: &str, subject: &str, body: &str) -> Result<(), ChannelError> {
        tracing::warn!(
            channel = %self.name,
            recipient = %recipient,
            subject = %subject,
            message = %body,
            "notification delivered"
        );
        Ok(())
    }
}

/// Workflow launcher that records accepted handoffs as structured logs.
#[derive(Debug, Clone, Default)]
pub struct LogWorkflowLauncher;

impl WorkflowLauncher for LogWorkflowLauncher {
    fn launch(&self, workflow_type: &str, event: &AnalyzedEvent) -> Result<(), ChannelError> {
        tracing::info!(
            workflow = %workflow_type,
            event_type = %event.event_type,
            severity = %event.severity,
            "workflow handoff accepted"
        );
        Ok(())
    }
}
