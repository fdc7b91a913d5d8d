use axum::{extract::Request, middleware::Next, response::Response};
use http::HeaderValue;
use uuid::Uuid;

use crate::app::REQUEST_ID_HEADER;

/// Request id attached to every request as an extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Ensures every request carries an `x-request-id`, generating one when the
/// caller did not send it.
pub async fn layer(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        req.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    req.extensions_mut().insert(RequestId(request_id));

    next.run(req).await
}
