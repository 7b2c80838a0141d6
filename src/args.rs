//! Command-line arguments for the `httpmon` binary
//!
//! Every flag is optional and overrides the matching field of the config
//! file (or the built-in default when no file is given).

use crate::config::{MonitorConfig, load_config};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Follow an HTTP access log, report traffic statistics and alert on high traffic
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "httpmon", version, about)]
pub struct Args {
    /// Access log file to follow (Common Log Format)
    #[arg(short, long, env = "HTTPMON_FILE")]
    pub file: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, env = "HTTPMON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of top sections to display
    #[arg(short, long, env = "HTTPMON_SECTIONS")]
    pub sections: Option<usize>,

    /// Seconds between summary reports (0 disables reporting)
    #[arg(short, long, env = "HTTPMON_REPORTING_INTERVAL")]
    pub reporting_interval: Option<u64>,

    /// Seconds of traffic averaged for alerting
    #[arg(short = 'w', long, env = "HTTPMON_ALERT_WINDOW")]
    pub alert_window: Option<u64>,

    /// Average hits per second that triggers an alert
    #[arg(short = 'a', long, env = "HTTPMON_ALERT_THRESHOLD")]
    pub alert_threshold: Option<f64>,

    /// Milliseconds per hit-rate bucket
    #[arg(long, env = "HTTPMON_QUANTUM_MS")]
    pub quantum_ms: Option<u64>,

    /// Number of worker threads (default: 1, use 0 for CPU cores)
    #[arg(short, long, env = "HTTPMON_THREADS")]
    pub threads: Option<usize>,

    /// Also write diagnostics to this file
    #[arg(long, env = "HTTPMON_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Merge defaults, the optional config file and these flags, then validate
    ///
    /// # Errors
    /// Returns error if the config file cannot be loaded or the merged
    /// configuration is invalid
    pub fn resolve_config(&self) -> Result<MonitorConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => MonitorConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Overwrite config fields with every flag that was given
    pub fn apply_overrides(&self, config: &mut MonitorConfig) {
        if let Some(file) = &self.file {
            config.file.clone_from(file);
        }
        if let Some(sections) = self.sections {
            config.sections = sections;
        }
        if let Some(secs) = self.reporting_interval {
            config.reporting_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = self.alert_window {
            config.alert_window = Duration::from_secs(secs);
        }
        if let Some(threshold) = self.alert_threshold {
            config.alert_threshold = threshold;
        }
        if let Some(ms) = self.quantum_ms {
            config.quantum = Duration::from_millis(ms);
        }
    }
}
