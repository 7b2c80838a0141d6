//! Configuration module
//!
//! Settings come from built-in defaults, an optional TOML file and command
//! line overrides, in that order. The merged config is validated once and
//! is immutable afterwards.

mod defaults;
mod duration;
mod loading;
mod types;
mod validation;

pub use duration::{duration_millis_serde, duration_serde};
pub use loading::load_config;
pub use types::MonitorConfig;

// Re-export default functions for use in tests and other modules
pub use defaults::{
    alert_check_quanta, alert_threshold, alert_window, line_buffer, max_recordable_size, quantum,
    reporting_interval, sections, size_history, size_rotation_threshold,
};
