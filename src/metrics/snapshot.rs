//! Point-in-time traffic summary
//!
//! A [`Summary`] is an owned copy of every aggregate, taken under one read
//! lock by [`Collector::snapshot`](super::Collector::snapshot). It is never
//! updated after creation; rendering lives in [`crate::report`].

use super::types::{SectionHits, StatusFreq};
use chrono::{DateTime, Local};
use hdrhistogram::Histogram;
use std::time::Duration;

/// Response size distribution statistics, in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizeDistribution {
    pub count: u64,
    pub min: u64,
    pub median: u64,
    pub mean: f64,
    pub p99: u64,
    pub max: u64,
    pub stddev: f64,
}

impl SizeDistribution {
    /// Extract summary statistics from a merged histogram
    #[must_use]
    pub fn from_histogram(hist: &Histogram<u64>) -> Self {
        if hist.len() == 0 {
            return Self::default();
        }
        Self {
            count: hist.len(),
            min: hist.min(),
            median: hist.value_at_quantile(0.5),
            mean: hist.mean(),
            p99: hist.value_at_quantile(0.99),
            max: hist.max(),
            stddev: hist.stdev(),
        }
    }
}

/// Snapshot of all traffic aggregates
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// When the snapshot was taken
    pub timestamp: DateTime<Local>,
    /// Records processed since startup
    pub total_hits: u64,
    /// Lines rejected as malformed, blank lines included
    pub skipped_lines: u64,
    /// Most visited sections, highest first
    pub top_sections: Vec<SectionHits>,
    /// Estimated distinct remote addresses
    pub distinct_ips: u64,
    pub sizes: SizeDistribution,
    pub status_freq: StatusFreq,
    /// Hits in the last completed quantum
    pub hits_per_quantum: u64,
    /// Length of one quantum
    pub quantum: Duration,
    /// Mean hits/s over the window, `None` until a quantum has completed
    pub avg_hits: Option<f64>,
    /// Averaging window
    pub window: Duration,
}

impl Summary {
    /// Records whose status fell in one of the five classes
    #[must_use]
    pub const fn classified_hits(&self) -> u64 {
        self.status_freq.total()
    }

    /// Hits per second in the last completed quantum
    #[must_use]
    pub fn latest_rate(&self) -> f64 {
        let secs = self.quantum.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.hits_per_quantum as f64 / secs
    }

    /// Lines seen by the pipeline, valid or not
    #[must_use]
    pub const fn lines_seen(&self) -> u64 {
        self.total_hits + self.skipped_lines
    }
}
