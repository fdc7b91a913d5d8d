use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use axum_client_ip::ClientIp;
use http::HeaderValue;
use tracing::{info, warn};

use crate::{errors::InjectedFault, middleware::request_id::RequestId};

pub const RESPONSE_TIME_HEADER: &str = "x-response-time";

/// One access-log line per request plus the `x-response-time` header
/// (milliseconds, including any injected delay).
pub async fn layer(ClientIp(client_ip): ClientIp, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    let mut response = next.run(req).await;

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    if let Ok(value) = HeaderValue::from_str(&format!("{:.3}", elapsed_ms)) {
        response.headers_mut().insert(RESPONSE_TIME_HEADER, value);
    }

    let status = response.status().as_u16();
    let injected = response.extensions().get::<InjectedFault>().is_some();
    if response.status().is_server_error() {
        warn!(%request_id, client_ip = %client_ip, method = %method, path = %path, status, injected, elapsed_ms, "request failed");
    } else {
        info!(%request_id, client_ip = %client_ip, method = %method, path = %path, status, elapsed_ms, "request completed");
    }

    response
}
