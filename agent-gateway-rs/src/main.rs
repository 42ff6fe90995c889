// agent-gateway-rs/src/main.rs
// HTTP entry point for the backend operations agent pipeline.
//
// Wires together:
// - Analysis agent (keyword classification)
// - Event router (action decisions)
// - Action executor (notification/workflow side effects)
// - Exception capture boundary (fail-open dispatch to the analysis service)

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use action_executor::{ActionExecutor, ExecutorConfig};
use agent_gateway::{build_router, AppState, START_TIME};
use analysis_agent::KeywordClassifier;
use event_router::EventRouter;
use exception_capture::{CaptureConfig, Dispatcher};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let _ = *START_TIME;

    let capture_config = CaptureConfig::from_env();
    tracing::info!(
        enabled = capture_config.enabled,
        endpoint = ?capture_config.endpoint,
        mode = ?capture_config.mode,
        "exception capture configured"
    );
    let dispatcher = Arc::new(Dispatcher::new(capture_config)?);

    let executor_config = ExecutorConfig::from_env();
    if executor_config.admin_recipients.is_empty() {
        tracing::warn!("no admin recipients configured; notify_admin will report failure");
    }

    let mut router = EventRouter::new();
    if let Some(raw) = config_rs::env_opt("AGENT_ROUTING_RULES") {
        match serde_json::from_str(&raw) {
            Ok(rules) => router.apply_custom_rules(&rules),
            Err(err) => {
                tracing::warn!(error = %err, "AGENT_ROUTING_RULES is not valid JSON, ignoring")
            }
        }
    }

    let state = Arc::new(AppState {
        classifier: Box::new(KeywordClassifier::new()),
        router,
        executor: ActionExecutor::new(executor_config),
        dispatcher,
    });

    let app = build_router(state);

    let addr = config_rs::get_bind_address("AGENT_GATEWAY", 8080);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "agent gateway starting");
    println!("Agent gateway listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
