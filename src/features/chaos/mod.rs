//! Latency and failure injection driven by the live runtime configuration.

pub mod injector;
pub mod random;
