//! Constants used throughout the monitor
//!
//! Tuning values for the approximate aggregates. These are fixed at build
//! time; the user-facing knobs live in [`crate::config`].

/// Approximate structure parameters
pub mod sketch {
    /// Count-min overcount bound, relative to total adds
    pub const TOP_K_EPSILON: f64 = 0.001;

    /// Probability that the count-min bound holds
    pub const TOP_K_CONFIDENCE: f64 = 0.99;

    /// Target relative error of the distinct visitor count
    pub const CARDINALITY_ERROR_RATE: f64 = 0.01;

    /// Significant digits kept by the response size histogram
    pub const SIZE_SIGFIGS: u8 = 3;
}

/// Hit-rate ring
pub mod rate {
    /// Most completed quanta one alert window may span
    pub const MAX_WINDOW_SLOTS: usize = 1 << 20;
}

/// Report output
pub mod report {
    /// Timestamp layout of report headers, e.g. `01/02/06 15:04:05`
    pub const HEADER_TIME_FORMAT: &str = "%m/%d/%y %H:%M:%S";

    /// Timestamp layout of alert lines
    pub const ALERT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";
}
