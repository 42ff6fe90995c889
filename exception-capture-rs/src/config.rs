//! Capture boundary configuration.

use serde::{Deserialize, Serialize};

/// How a capture is handed to the analysis endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Dispatch on the request's own execution context, bounded by the
    /// configured timeout.
    Blocking,
    /// Hand an owned snapshot to a background task and return immediately.
    Background,
}

/// Configuration for the exception capture boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub enabled: bool,
    /// Analysis endpoint accepting the ExceptionContext JSON shape.
    pub endpoint: Option<String>,
    /// Optional bearer credential for the endpoint.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Request-body capture cap in bytes.
    pub max_body_size: usize,
    pub environment: String,
    pub hostname: String,
    pub version: String,
    pub mode: DispatchMode,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            api_key: None,
            timeout_secs: 5,
            max_body_size: 10_000,
            environment: "development".to_string(),
            hostname: "unknown".to_string(),
            version: "unknown".to_string(),
            mode: DispatchMode::Background,
        }
    }
}

impl CaptureConfig {
    /// Loads the capture configuration from `AGENT_CAPTURE_*` environment
    /// variables. Enabled without an endpoint downgrades to disabled with
    /// a warning: exception data is still logged locally, just not sent.
    pub fn from_env() -> Self {
        let mut config = Self {
            enabled: config_rs::env_flag("AGENT_CAPTURE_ENABLED", true),
            endpoint: config_rs::env_opt("AGENT_CAPTURE_ENDPOINT"),
            api_key: config_rs::env_opt("AGENT_CAPTURE_API_KEY"),
            timeout_secs: config_rs::env_u64("AGENT_CAPTURE_TIMEOUT", 5),
            max_body_size: config_rs::env_usize("AGENT_CAPTURE_MAX_BODY_SIZE", 10_000),
            environment: config_rs::env_string("AGENT_ENVIRONMENT", "development"),
            hostname: config_rs::env_string("AGENT_HOSTNAME", "unknown"),
            version: config_rs::env_string("AGENT_VERSION", "unknown"),
            mode: match config_rs::env_string("AGENT_CAPTURE_MODE", "background").as_str() {
                "blocking" => DispatchMode::Blocking,
                _ => DispatchMode::Background,
            },
        };

        if config.enabled && config.endpoint.is_none() {
            tracing::warn!(
                "AGENT_CAPTURE_ENDPOINT not configured; exception data will be logged but not dispatched"
            );
            config.enabled = false;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disabled_background() {
        let config = CaptureConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.mode, DispatchMode::Background);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.max_body_size, 10_000);
    }

    #[test]
    fn test_enabled_without_endpoint_downgrades() {
        std::env::set_var("AGENT_CAPTURE_ENABLED", "true");
        std::env::remove_var("AGENT_CAPTURE_ENDPOINT");

        let config = CaptureConfig::from_env();
        assert!(!config.enabled);

        std::env::remove_var("AGENT_CAPTURE_ENABLED");
    }
}
