// Application-wide constants

/// Service identity reported by the health endpoint
pub mod service {
    pub const NAME: &str = "shopping-app";
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";
}

/// Default latency profile (milliseconds)
pub mod latency {
    pub const BASE_MS: u64 = 50;
    pub const PRODUCT_MS: u64 = 200;
    pub const CART_MS: u64 = 300;
    pub const CHECKOUT_MS: u64 = 800;
    pub const CHAOS_MULTIPLIER: f64 = 10.0;
    /// Jitter applied around the planned delay (±20%)
    pub const JITTER_FRACTION: f64 = 0.2;
}

/// Default failure probabilities
pub mod failure {
    pub const DB_RATE: f64 = 0.05;
    pub const PAYMENT_RATE: f64 = 0.10;
}

/// Environment variable names
pub mod env {
    pub const BASE_LATENCY_MS: &str = "BASE_LATENCY_MS";
    pub const PRODUCT_LATENCY_MS: &str = "PRODUCT_LATENCY_MS";
    pub const CART_LATENCY_MS: &str = "CART_LATENCY_MS";
    pub const CHECKOUT_LATENCY_MS: &str = "CHECKOUT_LATENCY_MS";
    pub const DB_FAILURE_RATE: &str = "DB_FAILURE_RATE";
    pub const PAYMENT_FAILURE_RATE: &str = "PAYMENT_FAILURE_RATE";
    pub const CHAOS_MODE: &str = "CHAOS_MODE";
    pub const CHAOS_LATENCY_MULTIPLIER: &str = "CHAOS_LATENCY_MULTIPLIER";
    pub const LISTEN_ADDR: &str = "LISTEN_ADDR";
    pub const CHAOS_CONFIG_PATH: &str = "CHAOS_CONFIG_PATH";
    pub const METRICS_ENABLED: &str = "METRICS_ENABLED";
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
}

/// Order confirmation numbering
pub mod orders {
    pub const PREFIX: &str = "ORD-";
    pub const NUMBER_MIN: u32 = 10_000;
    pub const NUMBER_MAX: u32 = 99_999;
}

/// Monitoring configuration
pub mod monitoring {
    pub const METRICS_INTERVAL_SECONDS: u64 = 60; // 1 minute
}

/// Hot reload configuration
pub mod hot_reload {
    pub const CHANNEL_BUFFER_SIZE: usize = 32;
    pub const DEBOUNCE_MS: u64 = 100;
}
