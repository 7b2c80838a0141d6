//! Default values for configuration fields
//!
//! This module centralizes all default value functions used in serde deserialization.

use std::time::Duration;

/// Number of top sections shown in each report
#[inline]
pub fn sections() -> usize {
    5
}

/// Interval between summary reports
#[inline]
pub fn reporting_interval() -> Duration {
    Duration::from_secs(10)
}

/// Window over which the alert average is taken (2 minutes)
#[inline]
pub fn alert_window() -> Duration {
    Duration::from_secs(120)
}

/// Average hits per second above which an alert fires
#[inline]
pub fn alert_threshold() -> f64 {
    10.0
}

/// Granularity of the hit rate ring
#[inline]
pub fn quantum() -> Duration {
    Duration::from_secs(1)
}

/// Alert evaluation period, in quanta
#[inline]
pub fn alert_check_quanta() -> u32 {
    2
}

/// Records between size histogram rotations
#[inline]
pub fn size_rotation_threshold() -> u64 {
    100_000
}

/// Size histogram buckets retained, including the current one
#[inline]
pub fn size_history() -> usize {
    5
}

/// Largest response size tracked exactly; larger sizes are clamped (1 TB)
#[inline]
pub fn max_recordable_size() -> u64 {
    1_000_000_000_000
}

/// Capacity of the channel between the tailer and the collector
#[inline]
pub fn line_buffer() -> usize {
    1024
}
