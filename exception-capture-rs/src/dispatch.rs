//! Fail-open delivery of exception snapshots to the analysis endpoint.
//!
//! Every dispatch resolves to a [`DispatchOutcome`]: the analysis layer
//! being slow or down must never turn one outage into two, so timeouts,
//! connection failures, and non-success responses all suppress locally
//! instead of propagating.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;

use crate::config::{CaptureConfig, DispatchMode};
use crate::context::ExceptionContext;

/// Setup failure while constructing the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Terminal state of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The analysis endpoint accepted the snapshot.
    Delivered,
    /// Delivery failed or was skipped; the snapshot was dropped after
    /// local logging. Not retried.
    Suppressed { reason: String },
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered)
    }

    fn suppressed<S: Into<String>>(reason: S) -> Self {
        DispatchOutcome::Suppressed {
            reason: reason.into(),
        }
    }
}

/// Sends exception snapshots to the configured analysis endpoint.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: CaptureConfig,
    client: reqwest::Client,
}

impl Dispatcher {
    pub fn new(config: CaptureConfig) -> Result<Self, CaptureError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn mode(&self) -> DispatchMode {
        self.config.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled && self.config.endpoint.is_some()
    }

    /// Dispatches one snapshot, bounded by the configured timeout. Always
    /// resolves; never returns an error or panics.
    pub async fn dispatch(&self, ctx: &ExceptionContext) -> DispatchOutcome {
        if !self.config.enabled {
            return self.suppress(ctx, "capture disabled");
        }
        let Some(endpoint) = self.config.endpoint.clone() else {
            return self.suppress(ctx, "endpoint not configured");
        };

        let mut request = self.client.post(&endpoint).json(ctx);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                counter!("capture.dispatch.delivered", 1);
                tracing::info!(
                    capture_id = %ctx.id,
                    exception = %ctx.exception.kind,
                    endpoint = %endpoint,
                    "exception snapshot delivered to analysis service"
                );
                DispatchOutcome::Delivered
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let preview: String = body.chars().take(200).collect();
                self.suppress(
                    ctx,
                    &format!("analysis endpoint returned {} - {}", status, preview),
                )
            }
            Err(err) if err.is_timeout() => self.suppress(
                ctx,
                &format!("timeout after {}s", self.config.timeout_secs),
            ),
            Err(err) => self.suppress(ctx, &format!("delivery error: {}", err)),
        }
    }

    /// Hands an owned snapshot to a background task and returns
    /// immediately. The task has no link back to the originating request;
    /// process shutdown may drop it (best-effort delivery).
    pub fn dispatch_background(self: &Arc<Self>, ctx: ExceptionContext) {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = dispatcher.dispatch(&ctx).await;
            tracing::debug!(capture_id = %ctx.id, ?outcome, "background dispatch finished");
        });
    }

    fn suppress(&self, ctx: &ExceptionContext, reason: &str) -> DispatchOutcome {
        counter!("capture.dispatch.suppressed", 1);
        tracing::warn!(
            capture_id = %ctx.id,
            exception = %ctx.exception.kind,
            reason = %reason,
            "exception dispatch suppressed"
        );
        DispatchOutcome::suppressed(reason)
    }
}
