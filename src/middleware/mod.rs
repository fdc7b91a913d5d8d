//! Middleware module providing request processing layers.
//!
//! Available middleware:
//! - `request_id` - Request tracing
//! - `access_log` - Access logging and response timing

pub mod access_log;
pub mod request_id;
