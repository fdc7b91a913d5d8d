use std::sync::Arc;

use axum::extract::State;

use crate::{errors::AppError, state::AppState};

/// Renders the Prometheus exposition text when metrics are enabled.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Result<String, AppError> {
    state
        .prometheus_handle
        .as_ref()
        .map(|handle| handle.render())
        .ok_or_else(|| AppError::RouteNotFound("/metrics".to_string()))
}
