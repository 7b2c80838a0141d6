//! High traffic alerting
//!
//! [`AlertState`] is a two-state hysteresis machine over the windowed hit
//! rate. [`AlertTask`] evaluates it on a fixed cadence and appends every
//! transition to the report sink; lines are never retracted.

use crate::constants::report::ALERT_TIME_FORMAT;
use crate::metrics::HitRateAverager;
use crate::report::ReportSink;
use chrono::{DateTime, Local};
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A traffic state transition
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    /// `true` when traffic dropped back to or below the threshold
    pub recovered: bool,
    /// Average hits/s that caused the transition
    pub avg_hits: f64,
    /// When the transition was observed
    pub time: DateTime<Local>,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = self.time.format(ALERT_TIME_FORMAT);
        if self.recovered {
            write!(
                f,
                "Traffic recovered - hits = {:.2}, recovered at {}",
                self.avg_hits, time
            )
        } else {
            write!(
                f,
                "High traffic generated an alert - hits = {:.2}, triggered at {}",
                self.avg_hits, time
            )
        }
    }
}

/// Alerting state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertStatus {
    #[default]
    Normal,
    Alerting,
}

/// Hysteresis state machine over the average hit rate
#[derive(Debug, Clone)]
pub struct AlertState {
    status: AlertStatus,
    threshold: f64,
}

impl AlertState {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            status: AlertStatus::Normal,
            threshold,
        }
    }

    #[must_use]
    pub const fn status(&self) -> AlertStatus {
        self.status
    }

    #[must_use]
    pub const fn is_alerting(&self) -> bool {
        matches!(self.status, AlertStatus::Alerting)
    }

    /// Feed one average reading, returning the transition it caused, if any
    ///
    /// `Normal` moves to `Alerting` when `average > threshold`; `Alerting`
    /// moves back when `average <= threshold`. Without an average (window
    /// not yet observed) the state is left alone.
    pub fn evaluate(&mut self, average: Option<f64>, now: DateTime<Local>) -> Option<Alert> {
        let avg = average?;
        match self.status {
            AlertStatus::Normal if avg > self.threshold => {
                self.status = AlertStatus::Alerting;
                Some(Alert {
                    recovered: false,
                    avg_hits: avg,
                    time: now,
                })
            }
            AlertStatus::Alerting if avg <= self.threshold => {
                self.status = AlertStatus::Normal;
                Some(Alert {
                    recovered: true,
                    avg_hits: avg,
                    time: now,
                })
            }
            _ => None,
        }
    }
}

/// Periodic alert evaluation
#[derive(Debug)]
pub struct AlertTask {
    averager: HitRateAverager,
    state: AlertState,
    interval: Duration,
    sink: ReportSink,
    hook: Option<mpsc::Sender<Alert>>,
}

impl AlertTask {
    pub fn new(
        averager: HitRateAverager,
        threshold: f64,
        interval: Duration,
        sink: ReportSink,
        hook: Option<mpsc::Sender<Alert>>,
    ) -> Self {
        Self {
            averager,
            state: AlertState::new(threshold),
            interval,
            sink,
            hook,
        }
    }

    /// Evaluate once and publish any transition
    pub fn check(&mut self) -> Option<Alert> {
        let alert = self.state.evaluate(self.averager.average(), Local::now())?;
        if alert.recovered {
            info!(avg_hits = alert.avg_hits, "Traffic recovered");
        } else {
            warn!(avg_hits = alert.avg_hits, "High traffic alert");
        }
        self.sink.write_line(&alert);
        self.notify(&alert);
        Some(alert)
    }

    /// Offer the alert to the hook without ever waiting on it
    fn notify(&mut self, alert: &Alert) {
        let Some(hook) = &self.hook else { return };
        match hook.try_send(alert.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => debug!("Alert hook full, dropping notification"),
            Err(TrySendError::Closed(_)) => {
                debug!("Alert hook closed, no further notifications");
                self.hook = None;
            }
        }
    }

    /// Run until cancelled
    pub fn spawn(mut self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval_at(Instant::now() + self.interval, self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            debug!(interval = ?self.interval, "Starting alert task");

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        self.check();
                    }
                }
            }
            debug!("Alert task stopped");
        })
    }
}
