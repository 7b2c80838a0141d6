//! Configuration validation
//!
//! Rejects settings the pipeline cannot run with before anything starts.

use super::types::MonitorConfig;
use crate::error::MonitorError;
use crate::metrics::RateWindow;

impl MonitorConfig {
    /// Validate configuration for correctness
    ///
    /// # Errors
    /// - [`MonitorError::InvalidWindow`] if the quantum is zero, longer than the
    ///   window, or so short that the window needs too many slots
    /// - [`MonitorError::Config`] for any other unusable value
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.file.as_os_str().is_empty() {
            return Err(MonitorError::Config("a log file path is required".into()));
        }

        if RateWindow::slot_count(self.alert_window, self.quantum).is_none() {
            return Err(MonitorError::InvalidWindow {
                window: self.alert_window,
                quantum: self.quantum,
            });
        }

        if self.sections == 0 {
            return Err(MonitorError::Config(
                "sections must be at least 1".into(),
            ));
        }

        if self.alert_check_quanta == 0 {
            return Err(MonitorError::Config(
                "alert_check_quanta must be at least 1".into(),
            ));
        }

        if !self.alert_threshold.is_finite() || self.alert_threshold < 0.0 {
            return Err(MonitorError::Config(format!(
                "alert_threshold must be a non-negative number, got {}",
                self.alert_threshold
            )));
        }

        if self.size_rotation_threshold == 0 {
            return Err(MonitorError::Config(
                "size_rotation_threshold must be at least 1".into(),
            ));
        }

        if self.line_buffer == 0 {
            return Err(MonitorError::Config("line_buffer must be at least 1".into()));
        }

        if self.alert_window.as_nanos() % self.quantum.as_nanos() != 0 {
            tracing::warn!(
                "alert_window {:?} is not a multiple of quantum {:?}; the remainder is ignored",
                self.alert_window,
                self.quantum
            );
        }

        if !self.reporting_enabled() {
            tracing::info!("reporting_interval is 0, periodic reports are disabled");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn valid() -> MonitorConfig {
        MonitorConfig::for_file("/var/log/access.log")
    }

    #[test]
    fn test_default_for_file_is_valid() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_missing_file_rejected() {
        let err = MonitorConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("log file"));
    }

    #[test]
    fn test_window_shorter_than_quantum_rejected() {
        let config = MonitorConfig {
            alert_window: Duration::from_millis(500),
            ..valid()
        };
        assert!(matches!(
            config.validate(),
            Err(MonitorError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn test_window_with_too_many_quanta_rejected() {
        let config = MonitorConfig {
            alert_window: Duration::from_secs(1_000_000_000_000),
            quantum: Duration::from_millis(1),
            ..valid()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, MonitorError::InvalidWindow { .. }));
        assert!(err.is_config());
    }

    #[test]
    fn test_zero_quantum_rejected() {
        let config = MonitorConfig {
            quantum: Duration::ZERO,
            ..valid()
        };
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_bad_threshold_rejected() {
        for threshold in [f64::NAN, f64::INFINITY, -1.0] {
            let config = MonitorConfig {
                alert_threshold: threshold,
                ..valid()
            };
            assert!(config.validate().is_err(), "{threshold} accepted");
        }
    }

    #[test]
    fn test_zero_counts_rejected() {
        assert!(MonitorConfig { sections: 0, ..valid() }.validate().is_err());
        assert!(
            MonitorConfig {
                alert_check_quanta: 0,
                ..valid()
            }
            .validate()
            .is_err()
        );
        assert!(
            MonitorConfig {
                size_rotation_threshold: 0,
                ..valid()
            }
            .validate()
            .is_err()
        );
        assert!(MonitorConfig { line_buffer: 0, ..valid() }.validate().is_err());
    }

    #[test]
    fn test_zero_reporting_interval_is_valid() {
        let config = MonitorConfig {
            reporting_interval: Duration::ZERO,
            ..valid()
        };
        assert!(config.validate().is_ok());
    }
}
