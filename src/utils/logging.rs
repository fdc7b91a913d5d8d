//! Tracing setup and structured log helpers.
//!
//! Output goes to stdout so the cluster's log collector can pick it up.

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Fault, LogFormat, Operation, SimulationSettings};

pub fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if result.is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }
}

pub fn log_startup(component: &str, status: &str, detail: Option<&str>) {
    match detail {
        Some(detail) => info!(component, status, detail, "startup"),
        None => info!(component, status, "startup"),
    }
}

/// Logs an injected failure with the wording downstream alert rules match on.
pub fn log_fault_injected(fault: Fault, operation: Operation, probability: f64) {
    let message = match fault {
        Fault::Database => "ERROR: Database connection timeout after 30s",
        Fault::Payment => "ERROR: Payment gateway timeout - transaction failed",
    };
    error!(
        fault = fault.as_str(),
        operation = operation.as_str(),
        probability,
        injected = true,
        "{}",
        message
    );
}

pub fn log_settings_applied(source: &str, settings: &SimulationSettings) {
    let rendered = serde_json::to_string(settings).unwrap_or_else(|_| format!("{:?}", settings));
    info!(
        source,
        chaos_mode = settings.chaos_mode,
        chaos_latency_multiplier = settings.chaos_latency_multiplier,
        settings = %rendered,
        "Simulation settings applied"
    );
}

pub fn log_performance_metric(name: &str, value: f64, unit: &str, context: &str) {
    info!(metric = name, value, unit, context, "performance metric");
}
