//! Structured JSON log lines on stderr, one object per event.
//!
//! Every line carries the deployment environment recorded at cold start, or
//! `null` when the function runs outside a provisioned stage.

use std::sync::OnceLock;

use nlp_api_core::provisioning::DeploymentEnvironment;
use serde_json::{json, Value};

const COMPONENT: &str = "nlp_handler";

static ENVIRONMENT: OnceLock<DeploymentEnvironment> = OnceLock::new();

/// Records the environment stamped on subsequent lines. Only the first call
/// takes effect.
pub fn init(environment: Option<DeploymentEnvironment>) {
    if let Some(environment) = environment {
        let _ = ENVIRONMENT.set(environment);
    }
}

pub fn log_info(event: &str, details: Value) {
    eprintln!("{}", log_line(ENVIRONMENT.get().copied(), "info", event, details));
}

pub fn log_error(event: &str, details: Value) {
    eprintln!("{}", log_line(ENVIRONMENT.get().copied(), "error", event, details));
}

fn log_line(
    environment: Option<DeploymentEnvironment>,
    level: &str,
    event: &str,
    details: Value,
) -> Value {
    json!({
        "component": COMPONENT,
        "environment": environment.map(DeploymentEnvironment::as_str),
        "level": level,
        "event": event,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "details": details,
    })
}
