mod log_sanitizer;
pub mod ports;
pub mod services;

pub use log_sanitizer::sanitize_for_log;
