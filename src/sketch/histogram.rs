//! Rotating HDR histogram for value distributions

use hdrhistogram::Histogram;
use hdrhistogram::errors::CreationError;
use std::collections::VecDeque;

/// Histogram split into a current bucket and a bounded history
///
/// Values are recorded into the current bucket. [`rotate`](Self::rotate)
/// retires it into the history, dropping the oldest bucket once `buckets`
/// are held in total, and [`merge`](Self::merge) combines everything still
/// held into one read-only histogram.
#[derive(Debug, Clone)]
pub struct WindowedHistogram {
    current: Histogram<u64>,
    history: VecDeque<Histogram<u64>>,
    buckets: usize,
}

impl WindowedHistogram {
    /// Create a windowed histogram tracking `1..=max_value` with `sigfig`
    /// significant digits, retaining `buckets` buckets including the current
    ///
    /// # Errors
    /// Returns error if the bounds or precision are rejected by HdrHistogram
    pub fn new(max_value: u64, sigfig: u8, buckets: usize) -> Result<Self, CreationError> {
        let current = Histogram::new_with_bounds(1, max_value, sigfig)?;
        let buckets = buckets.max(1);
        Ok(Self {
            current,
            history: VecDeque::with_capacity(buckets - 1),
            buckets,
        })
    }

    /// Record a value into the current bucket, clamping to the trackable range
    pub fn record(&mut self, value: u64) {
        self.current.saturating_record(value);
    }

    /// Start a fresh current bucket
    pub fn rotate(&mut self) {
        let fresh = Histogram::new_from(&self.current);
        let retired = std::mem::replace(&mut self.current, fresh);
        if self.buckets > 1 {
            if self.history.len() == self.buckets - 1 {
                self.history.pop_front();
            }
            self.history.push_back(retired);
        }
    }

    /// All retained buckets combined
    #[must_use]
    pub fn merge(&self) -> Histogram<u64> {
        let mut merged = self.current.clone();
        for bucket in &self.history {
            // Buckets share bounds, so addition cannot overflow the range
            if let Err(e) = merged.add(bucket) {
                tracing::debug!(error = %e, "Skipping histogram bucket in merge");
            }
        }
        merged
    }

    /// Number of values in the current bucket
    #[must_use]
    pub fn current_len(&self) -> u64 {
        self.current.len()
    }

    /// Number of buckets currently held, including the current one
    #[must_use]
    pub fn held(&self) -> usize {
        self.history.len() + 1
    }
}
