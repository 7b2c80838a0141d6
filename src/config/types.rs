//! Configuration type definitions

use super::duration::{duration_millis_serde, duration_serde};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Monitor configuration
///
/// Every field has a default, so a TOML file only needs to name what it
/// changes:
///
/// ```toml
/// file = "/var/log/access.log"
/// alert_threshold = 25.0
/// alert_window = 60
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Access log to follow
    pub file: PathBuf,
    /// Number of top sections in each report
    pub sections: usize,
    /// Seconds between reports; 0 disables reporting
    #[serde(with = "duration_serde")]
    pub reporting_interval: Duration,
    /// Seconds of traffic averaged for alerting
    #[serde(with = "duration_serde")]
    pub alert_window: Duration,
    /// Average hits/s that triggers an alert
    pub alert_threshold: f64,
    /// Milliseconds per hit-rate bucket
    #[serde(with = "duration_millis_serde")]
    pub quantum: Duration,
    /// Quanta between alert evaluations
    pub alert_check_quanta: u32,
    /// Records between size histogram rotations
    pub size_rotation_threshold: u64,
    /// Size histogram buckets retained, including the current one
    pub size_history: usize,
    /// Response sizes above this are clamped
    pub max_recordable_size: u64,
    /// Lines buffered between tailer and collector
    pub line_buffer: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        use super::defaults;
        Self {
            file: PathBuf::new(),
            sections: defaults::sections(),
            reporting_interval: defaults::reporting_interval(),
            alert_window: defaults::alert_window(),
            alert_threshold: defaults::alert_threshold(),
            quantum: defaults::quantum(),
            alert_check_quanta: defaults::alert_check_quanta(),
            size_rotation_threshold: defaults::size_rotation_threshold(),
            size_history: defaults::size_history(),
            max_recordable_size: defaults::max_recordable_size(),
            line_buffer: defaults::line_buffer(),
        }
    }
}

impl MonitorConfig {
    /// Config for `file` with every other field at its default
    #[must_use]
    pub fn for_file(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    /// Period of alert evaluation
    #[must_use]
    pub fn alert_interval(&self) -> Duration {
        self.quantum.saturating_mul(self.alert_check_quanta)
    }

    /// Whether the periodic report is enabled
    #[must_use]
    pub fn reporting_enabled(&self) -> bool {
        !self.reporting_interval.is_zero()
    }
}
