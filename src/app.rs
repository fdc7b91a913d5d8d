use std::sync::Arc;

use anyhow::Error;
use axum::{extract::Request, middleware::from_fn, routing::{get, post}, Router};
use axum_client_ip::ClientIpSource;
use http::HeaderName;
use tower_http::{propagate_header::PropagateHeaderLayer, trace::TraceLayer};

use crate::{
    handlers::{add_to_cart, checkout, get_cart, get_product, health, list_categories, list_products, not_found},
    middleware::{access_log::layer as access_log_layer, request_id::layer as request_id_layer},
    state::AppState,
    utils::metric_handler::metrics_handler,
};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn create_app(state: Arc<AppState>) -> Result<Router, Error> {
    let shop_router = Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
        .route("/api/categories", get(list_categories))
        .route("/api/cart/{user_id}", get(get_cart))
        .route("/api/cart/{user_id}/add", post(add_to_cart))
        .route("/api/checkout", post(checkout));

    let mut router = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .merge(shop_router);

    if state.prometheus_handle.is_some() {
        router = router.route("/metrics", get(metrics_handler));
    }

    let router = router
        .fallback(not_found)
        .with_state(state)
        .layer(from_fn(access_log_layer))
        .layer(ClientIpSource::ConnectInfo.into_extension());

    Ok(router
        .layer(
        TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

            tracing::error_span!(
                    "request",
                    id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
            )
        })
        )
        .layer(PropagateHeaderLayer::new(HeaderName::from_static(REQUEST_ID_HEADER)))
        .layer(from_fn(request_id_layer))
    )
}
