//! Real-time HTTP access log monitor
//!
//! Follows a Common Log Format file as it grows, keeps bounded-memory
//! traffic statistics, prints periodic summaries and raises an alert when the
//! average hit rate over a sliding window crosses a threshold.
//!
//! ```no_run
//! use httpmon::{Monitor, MonitorConfig, MonitorOptions};
//!
//! # async fn run() -> Result<(), httpmon::MonitorError> {
//! let config = MonitorConfig::for_file("/var/log/access.log");
//! let monitor = Monitor::new(MonitorOptions::new(config))?;
//! monitor.run().await
//! # }
//! ```

pub mod alert;
pub mod args;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod monitor;
pub mod record;
pub mod report;
pub mod runtime;
pub mod sketch;
pub mod tail;

pub use alert::{Alert, AlertState, AlertStatus, AlertTask};
pub use config::{MonitorConfig, load_config};
pub use error::MonitorError;
pub use metrics::{Collector, HitRateAverager, RateWindow, Summary};
pub use monitor::{Monitor, MonitorOptions};
pub use record::{LogParser, RequestRecord, section_key};
pub use report::ReportSink;
pub use tail::LogTailer;
