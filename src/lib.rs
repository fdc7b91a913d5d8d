//! # Shopping workload simulator
//!
//! A small e-commerce REST service that exists to generate realistic traffic
//! for monitoring demos:
//! - Product catalog, per-user carts and checkout
//! - Configurable per-operation latency with jitter
//! - Probabilistic database and payment failures
//! - Chaos mode that multiplies latency
//! - Hot reload of chaos settings from a watched file
//! - Optional Prometheus metrics

pub mod config;
pub mod errors;
pub mod app;
pub mod state;
pub mod handlers;
pub mod middleware;
pub mod features;
pub mod utils;
pub mod constants;


use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use axum_prometheus::PrometheusMetricLayer;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use crate::utils::logging::*;

use crate::{
    config::{RuntimeConfig, ServiceConfig},
    features::chaos::random::ThreadRandom,
    state::AppState,
    utils::hot_reload,
};

/// Command-line overrides for values otherwise read from the environment.
#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    pub addr: Option<String>,
    pub chaos_config: Option<PathBuf>,
}

/// Starts the shop service and serves until Ctrl-C or SIGTERM.
pub async fn run(options: RunOptions) -> Result<()> {

    dotenv().ok();

    let mut service_config = ServiceConfig::from_env()?;
    if let Some(addr) = options.addr {
        service_config.addr = addr;
    }
    if let Some(path) = options.chaos_config {
        service_config.chaos_config_path = Some(path);
    }

    init_tracing(service_config.log_format);

    log_startup("configuration", "loaded", None);
    let baseline = service_config.simulation.clone();
    log_settings_applied("environment", &baseline);

    let runtime = Arc::new(RuntimeConfig::new(&baseline));

    if let Some(path) = &service_config.chaos_config_path {
        match hot_reload::reload_settings(path, &baseline, &runtime) {
            Ok(_) => log_startup("chaos_config", "loaded", Some(&path.display().to_string())),
            Err(e) => warn!("Chaos configuration not applied at startup: {}", e),
        }

        // start hot reloader
        let path = path.clone();
        let baseline = baseline.clone();
        let runtime = runtime.clone();
        tokio::spawn(async move {
            if let Err(e) = hot_reload::watch_chaos_config(path, baseline, runtime).await {
                // The service keeps running on the settings it already has.
                error!("Hot reload watcher failed to start: {}. Chaos changes will need a restart.", e);
            }
        });
    }

    let mut app_state = AppState::from_runtime(runtime, Arc::new(ThreadRandom));

    let prometheus_layer = if service_config.metrics_enabled {
        info!("Metrics reporting is enabled");
        let (layer, handle) = PrometheusMetricLayer::pair();
        app_state = app_state.with_metrics(handle);
        Some(layer)
    } else {
        None
    };

    let app_state = Arc::new(app_state);

    let carts = app_state.carts.clone();
    tokio::spawn(async move {
        use crate::constants::monitoring;
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(monitoring::METRICS_INTERVAL_SECONDS));
        loop {
            interval.tick().await;
            let cart_count = carts.get_active_carts_count();
            log_performance_metric("active_carts", cart_count as f64, "count", "monitoring");
        }
    });

    let mut app = app::create_app(app_state)?;

    if let Some(layer) = prometheus_layer {
        app = app.layer(layer);
    }

    let addr = service_config.addr.clone();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Shopping app listening on {}", &addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM so rolling restarts drain in-flight requests.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
