pub mod hot_reload;
pub mod logging;
pub mod metric_handler;
