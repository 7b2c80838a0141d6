//! Sliding-window hit rate averaging
//!
//! Hits are bucketed into quanta on a ring of `window / quantum + 1` slots.
//! One slot is always the in-progress quantum and is left out of averages.
//! Slots that have never been reached stay [`Slot::Empty`] so an average
//! taken before the window fills is based only on quanta actually observed.

use crate::constants::rate::MAX_WINDOW_SLOTS;
use crate::error::MonitorError;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// One quantum's worth of hits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Slot {
    /// No data observed for this quantum yet
    #[default]
    Empty,
    /// Hits counted during this quantum (possibly zero)
    Count(u64),
}

impl Slot {
    #[inline]
    fn count(self) -> Option<u64> {
        match self {
            Self::Empty => None,
            Self::Count(n) => Some(n),
        }
    }
}

/// Ring of per-quantum hit counters
#[derive(Debug, Clone)]
pub struct RateWindow {
    slots: Vec<Slot>,
    cursor: usize,
    quantum: Duration,
    window: Duration,
    horizon: TimeDelta,
}

impl RateWindow {
    /// Number of completed quanta a `window` holds
    ///
    /// `None` if `quantum` is zero, longer than `window`, or the window would
    /// need more than [`MAX_WINDOW_SLOTS`] slots.
    #[must_use]
    pub fn slot_count(window: Duration, quantum: Duration) -> Option<usize> {
        if quantum.is_zero() || window < quantum {
            return None;
        }
        usize::try_from(window.as_nanos() / quantum.as_nanos())
            .ok()
            .filter(|&len| len <= MAX_WINDOW_SLOTS)
    }

    /// Create a ring covering `window` in steps of `quantum`
    ///
    /// # Errors
    /// Returns [`MonitorError::InvalidWindow`] if `quantum` is zero, longer
    /// than `window`, or too small to fit the window in the ring
    pub fn new(window: Duration, quantum: Duration) -> Result<Self, MonitorError> {
        let invalid = || MonitorError::InvalidWindow { window, quantum };
        let len = Self::slot_count(window, quantum).ok_or_else(invalid)?;
        let horizon = TimeDelta::from_std(window).map_err(|_| invalid())?;

        Ok(Self {
            // Extra slot for the in-progress quantum
            slots: vec![Slot::Empty; len + 1],
            cursor: 0,
            quantum,
            window,
            horizon,
        })
    }

    /// Move to the next quantum, resetting it to a populated zero
    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.slots.len();
        self.slots[self.cursor] = Slot::Count(0);
    }

    /// Count a hit that happened at `at`, judged against `now`
    ///
    /// Hits older than the window are dropped and `false` is returned.
    pub fn record(&mut self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if at < now - self.horizon {
            return false;
        }
        let slot = &mut self.slots[self.cursor];
        *slot = Slot::Count(slot.count().unwrap_or(0).saturating_add(1));
        true
    }

    /// Mean hits per second over the completed quanta in the window
    ///
    /// Returns `None` until at least one completed quantum has data.
    #[must_use]
    pub fn average(&self) -> Option<f64> {
        let (sum, populated) = self
            .slots
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != self.cursor)
            .filter_map(|(_, slot)| slot.count())
            .fold((0u64, 0u32), |(sum, n), count| (sum.saturating_add(count), n + 1));

        if populated == 0 {
            return None;
        }
        Some(sum as f64 / (f64::from(populated) * self.quantum.as_secs_f64()))
    }

    /// Hits in the most recently completed quantum, 0 if none yet
    #[must_use]
    pub fn latest(&self) -> u64 {
        let last = (self.cursor + self.slots.len() - 1) % self.slots.len();
        self.slots[last].count().unwrap_or(0)
    }

    /// Number of slots, including the in-progress one
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether any slot, including the in-progress one, holds a count
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.slots.iter().any(|s| *s != Slot::Empty)
    }

    #[must_use]
    pub const fn quantum(&self) -> Duration {
        self.quantum
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }
}

/// Shared handle to a [`RateWindow`] driven by a background ticker
///
/// Cloning is cheap and all clones see the same ring.
#[derive(Debug, Clone)]
pub struct HitRateAverager {
    ring: Arc<RwLock<RateWindow>>,
    quantum: Duration,
    window: Duration,
}

impl HitRateAverager {
    /// # Errors
    /// Returns [`MonitorError::InvalidWindow`] for an invalid window/quantum pair
    pub fn new(window: Duration, quantum: Duration) -> Result<Self, MonitorError> {
        let ring = RateWindow::new(window, quantum)?;
        Ok(Self {
            ring: Arc::new(RwLock::new(ring)),
            quantum,
            window,
        })
    }

    /// Record one hit; returns `false` if it fell outside the window
    pub fn ingest(&self, at: DateTime<Utc>) -> bool {
        self.ingest_at(at, Utc::now())
    }

    /// Record one hit judged against an explicit `now`
    pub fn ingest_at(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.ring.write().record(at, now)
    }

    /// See [`RateWindow::average`]
    #[must_use]
    pub fn average(&self) -> Option<f64> {
        self.ring.read().average()
    }

    /// See [`RateWindow::latest`]
    #[must_use]
    pub fn latest(&self) -> u64 {
        self.ring.read().latest()
    }

    /// Advance the ring by one quantum
    pub fn tick(&self) {
        self.ring.write().advance();
    }

    #[must_use]
    pub const fn quantum(&self) -> Duration {
        self.quantum
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Spawn the ticker that advances the ring once per quantum until cancelled
    ///
    /// Missed ticks are skipped rather than replayed, so a stalled runtime
    /// never wipes several slots at once.
    pub fn spawn_ticker(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let averager = self.clone();
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval_at(Instant::now() + averager.quantum, averager.quantum);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            debug!(quantum = ?averager.quantum, "Starting rate ticker");

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => averager.tick(),
                }
            }
            debug!("Rate ticker stopped");
        })
    }
}
