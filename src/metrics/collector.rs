//! Aggregate traffic statistics

use super::averager::HitRateAverager;
use super::snapshot::{SizeDistribution, Summary};
use super::types::{SectionHits, StatusFreq};
use crate::config::MonitorConfig;
use crate::constants::sketch::{
    CARDINALITY_ERROR_RATE, SIZE_SIGFIGS, TOP_K_CONFIDENCE, TOP_K_EPSILON,
};
use crate::error::MonitorError;
use crate::record::{RequestLineParser, RequestRecord, section_key};
use crate::sketch::{
    CardinalityEstimator, DistributionEstimator, FrequencySketch, HyperLogLog, TopK,
    WindowedHistogram,
};
use chrono::{DateTime, Local, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, trace};

// ============================================================================
// Internal Storage Types
// ============================================================================

/// Everything mutated by `process`, guarded by one lock
#[derive(Debug)]
struct AggregateState {
    total_hits: u64,
    skipped_lines: u64,
    top_sections: Box<dyn FrequencySketch>,
    distinct_ips: Box<dyn CardinalityEstimator>,
    sizes: Box<dyn DistributionEstimator>,
    status_freq: StatusFreq,
    rotation_threshold: u64,
}

impl AggregateState {
    fn record_size(&mut self, size: u64) {
        self.sizes.record(size);
        if self.total_hits.is_multiple_of(self.rotation_threshold) {
            self.sizes.rotate();
            debug!(total_hits = self.total_hits, "Rotated response size histogram");
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Thread-safe statistics collector
///
/// `process` is the only writer and takes the lock exclusively for the
/// duration of one record. Readers (`snapshot`, `top_sections`) share the
/// lock and copy what they need out of it. Clones share state.
#[derive(Debug, Clone)]
pub struct Collector {
    state: Arc<RwLock<AggregateState>>,
    averager: HitRateAverager,
    requests: RequestLineParser,
}

impl Collector {
    /// Create a collector from validated configuration
    ///
    /// # Errors
    /// Returns error if the window/quantum pair or the size histogram bounds
    /// are invalid
    pub fn new(config: &MonitorConfig) -> Result<Self, MonitorError> {
        let averager = HitRateAverager::new(config.alert_window, config.quantum)?;
        let sizes = WindowedHistogram::new(
            config.max_recordable_size,
            SIZE_SIGFIGS,
            config.size_history,
        )
        .map_err(|e| MonitorError::Config(format!("response size histogram: {e}")))?;

        let state = AggregateState {
            total_hits: 0,
            skipped_lines: 0,
            top_sections: Box::new(TopK::new(TOP_K_EPSILON, TOP_K_CONFIDENCE, config.sections)),
            distinct_ips: Box::new(HyperLogLog::with_error_rate(CARDINALITY_ERROR_RATE)),
            sizes: Box::new(sizes),
            status_freq: StatusFreq::default(),
            rotation_threshold: config.size_rotation_threshold.max(1),
        };

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            averager,
            requests: RequestLineParser::new(),
        })
    }

    /// Fold one record into every aggregate
    ///
    /// Never fails: a malformed request line only skips the section update,
    /// an out-of-range status only skips the status histogram, and a missing
    /// timestamp only skips the rate averager.
    pub fn process(&self, record: &RequestRecord) {
        let mut state = self.state.write();
        state.total_hits += 1;

        match self.requests.parse(&record.request) {
            Some(request) => state.top_sections.add(section_key(request.path)),
            None => trace!(request = %record.request, "Malformed request line, skipping section"),
        }

        state.distinct_ips.add(record.remote_addr.as_bytes());
        state.record_size(record.size);
        state.status_freq.record(record.status);

        // Still under the collector lock so snapshots see the hit everywhere or nowhere
        match record.timestamp {
            Some(ts) => {
                if !self.averager.ingest(ts.with_timezone(&Utc)) {
                    trace!(timestamp = %ts, "Hit outside averaging window, dropped");
                }
            }
            None => trace!("Record without timestamp, not averaged"),
        }
    }

    /// Count a line that could not be parsed
    pub fn record_skipped(&self) {
        self.state.write().skipped_lines += 1;
    }

    /// Point-in-time copy of all aggregates
    #[must_use]
    pub fn snapshot(&self) -> Summary {
        self.snapshot_at(Local::now())
    }

    /// Snapshot stamped with an explicit time
    #[must_use]
    pub fn snapshot_at(&self, timestamp: DateTime<Local>) -> Summary {
        let state = self.state.read();
        Summary {
            timestamp,
            total_hits: state.total_hits,
            skipped_lines: state.skipped_lines,
            top_sections: state
                .top_sections
                .elements()
                .into_iter()
                .map(SectionHits::from)
                .collect(),
            distinct_ips: state.distinct_ips.count(),
            sizes: SizeDistribution::from_histogram(&state.sizes.merge()),
            status_freq: state.status_freq,
            hits_per_quantum: self.averager.latest(),
            quantum: self.averager.quantum(),
            avg_hits: self.averager.average(),
            window: self.averager.window(),
        }
    }

    /// Current top sections, highest first
    #[must_use]
    pub fn top_sections(&self) -> Vec<SectionHits> {
        self.state
            .read()
            .top_sections
            .elements()
            .into_iter()
            .map(SectionHits::from)
            .collect()
    }

    /// Records processed so far
    #[must_use]
    pub fn total_hits(&self) -> u64 {
        self.state.read().total_hits
    }

    /// Values in the active size histogram bucket
    #[must_use]
    pub fn active_size_bucket_len(&self) -> u64 {
        self.state.read().sizes.current_len()
    }

    /// Hit rate averager fed by this collector
    #[must_use]
    pub fn averager(&self) -> &HitRateAverager {
        &self.averager
    }
}
