use axum::{extract::rejection::JsonRejection, http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use std::fmt;

/// Response extension marking a failure produced by the fault injector.
#[derive(Debug, Clone, Copy)]
pub struct InjectedFault;

#[derive(Debug)]
pub enum AppError {
    // Caller errors
    ProductNotFound,
    RouteNotFound(String),
    InvalidInput(String),
    EmptyCart,

    // Injected failures
    DatabaseUnavailable,
    PaymentDeclined,

    // Hot reload errors
    HotReloadError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ProductNotFound | AppError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) | AppError::EmptyCart => StatusCode::BAD_REQUEST,
            AppError::DatabaseUnavailable
            | AppError::PaymentDeclined
            | AppError::HotReloadError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for failures produced by the fault injector rather than the caller.
    pub fn is_injected(&self) -> bool {
        matches!(self, AppError::DatabaseUnavailable | AppError::PaymentDeclined)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::ProductNotFound => json!({ "error": "Product not found", "status": "error" }),
            AppError::RouteNotFound(path) => {
                json!({ "error": "Not found", "path": path, "status": "error" })
            }
            AppError::InvalidInput(reason) => json!({ "error": reason, "status": "error" }),
            AppError::EmptyCart => json!({ "error": "Cart is empty", "status": "error" }),
            AppError::DatabaseUnavailable => {
                json!({ "error": "Database connection failed", "status": "error" })
            }
            AppError::PaymentDeclined => {
                json!({ "error": "Payment processing failed", "status": "error" })
            }
            AppError::HotReloadError(msg) => {
                tracing::error!("Hot reload error: {}", msg);
                json!({ "error": "Configuration reload failed", "status": "error" })
            }
        };

        let mut response = (status, Json(body)).into_response();
        if self.is_injected() {
            response.extensions_mut().insert(InjectedFault);
        }
        response
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ProductNotFound => write!(f, "Product not found"),
            AppError::RouteNotFound(path) => write!(f, "Route not found: {}", path),
            AppError::InvalidInput(reason) => write!(f, "Invalid input: {}", reason),
            AppError::EmptyCart => write!(f, "Cart is empty"),
            AppError::DatabaseUnavailable => write!(f, "Database connection failed"),
            AppError::PaymentDeclined => write!(f, "Payment processing failed"),
            AppError::HotReloadError(msg) => write!(f, "Hot reload error: {}", msg),
        }
    }
}
