//! Pipeline orchestration
//!
//! [`Monitor`] wires the tailer, parser and collector into the ingestion
//! path and runs the rate ticker, report task and alert task beside it.
//! Every task holds a child of one cancellation token and is joined before
//! [`Monitor::run`] returns.

use crate::alert::{Alert, AlertTask};
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::metrics::Collector;
use crate::record::LogParser;
use crate::report::ReportSink;
use crate::tail::{LineStream, LogTailer};
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Everything needed to build a [`Monitor`]
pub struct MonitorOptions {
    pub config: MonitorConfig,
    /// Report and alert destination; stdout when `None`
    pub output: Option<Box<dyn Write + Send>>,
    /// Receives every alert transition, best effort
    pub alert_hook: Option<mpsc::Sender<Alert>>,
}

impl MonitorOptions {
    #[must_use]
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            output: None,
            alert_hook: None,
        }
    }

    #[must_use]
    pub fn with_output(mut self, output: Box<dyn Write + Send>) -> Self {
        self.output = Some(output);
        self
    }

    #[must_use]
    pub fn with_alert_hook(mut self, hook: mpsc::Sender<Alert>) -> Self {
        self.alert_hook = Some(hook);
        self
    }
}

impl std::fmt::Debug for MonitorOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorOptions")
            .field("config", &self.config)
            .field("output", &self.output.is_some())
            .field("alert_hook", &self.alert_hook.is_some())
            .finish()
    }
}

/// Log monitor pipeline
#[derive(Debug)]
pub struct Monitor {
    config: MonitorConfig,
    collector: Collector,
    parser: LogParser,
    tailer: LogTailer,
    sink: ReportSink,
    alert_hook: Option<mpsc::Sender<Alert>>,
    cancel: CancellationToken,
}

impl Monitor {
    /// Validate the configuration and establish the file watch
    ///
    /// # Errors
    /// Returns a configuration error for invalid settings and
    /// [`MonitorError::Watch`] if the log file cannot be watched
    pub fn new(options: MonitorOptions) -> Result<Self, MonitorError> {
        let MonitorOptions {
            config,
            output,
            alert_hook,
        } = options;
        config.validate()?;

        let collector = Collector::new(&config)?;
        let cancel = CancellationToken::new();
        let tailer = LogTailer::new(&config.file, config.line_buffer, cancel.child_token())?;
        let sink = output.map_or_else(ReportSink::stdout, ReportSink::new);

        Ok(Self {
            config,
            collector,
            parser: LogParser::new(),
            tailer,
            sink,
            alert_hook,
            cancel,
        })
    }

    /// Shared handle to the live statistics
    #[must_use]
    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    #[must_use]
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Token that stops the pipeline when cancelled
    #[must_use]
    pub fn shutdown_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request shutdown; `run` returns once every task has joined
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Run until stopped or until the tailer fails
    ///
    /// # Errors
    /// Returns the fatal resource error that ended ingestion, if any
    pub async fn run(mut self) -> Result<(), MonitorError> {
        info!(file = %self.config.file.display(), "Starting monitor...");
        let mut lines = self.tailer.open().await?;

        let mut handles = vec![
            self.collector
                .averager()
                .spawn_ticker(self.cancel.child_token()),
        ];
        if self.config.reporting_enabled() {
            handles.push(spawn_reporter(
                self.collector.clone(),
                self.sink.clone(),
                self.config.reporting_interval,
                self.cancel.child_token(),
            ));
        }
        let alerts = AlertTask::new(
            self.collector.averager().clone(),
            self.config.alert_threshold,
            self.config.alert_interval(),
            self.sink.clone(),
            self.alert_hook.take(),
        );
        handles.push(alerts.spawn(self.cancel.child_token()));

        let result = ingest(&self.collector, &self.parser, &self.cancel, &mut lines).await;
        if let Err(e) = &result {
            error!(error = %e, "Ingestion stopped");
        }

        self.cancel.cancel();
        self.tailer.close().await;
        let drained = drain(&self.collector, &self.parser, &mut lines);
        debug!(lines = drained, "Drained queued lines");
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Monitor task failed");
            }
        }

        info!(total_hits = self.collector.total_hits(), "Monitor stopped");
        result
    }
}

/// Feed lines into the collector until cancelled or the stream ends
async fn ingest(
    collector: &Collector,
    parser: &LogParser,
    cancel: &CancellationToken,
    lines: &mut LineStream,
) -> Result<(), MonitorError> {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            line = lines.recv() => match line {
                Some(Ok(line)) => handle_line(collector, parser, &line),
                Some(Err(e)) => return Err(e),
                None => return Ok(()),
            },
        }
    }
}

/// Process the lines the follower already queued; returns how many
///
/// Stops at the first error item or once the queue is empty.
fn drain(collector: &Collector, parser: &LogParser, lines: &mut LineStream) -> usize {
    let mut drained = 0;
    while let Ok(Ok(line)) = lines.try_recv() {
        handle_line(collector, parser, &line);
        drained += 1;
    }
    drained
}

/// Blank lines count as skipped like any other line that fails to parse
fn handle_line(collector: &Collector, parser: &LogParser, line: &str) {
    match parser.parse(line) {
        Some(record) => collector.process(&record),
        None => {
            warn!(line = %line, "Skipping log line not in Common Log Format");
            collector.record_skipped();
        }
    }
}

/// Write a snapshot to `sink` every `period` until cancelled
fn spawn_reporter(
    collector: Collector,
    sink: ReportSink,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(interval = ?period, "Starting report task");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => sink.write_line(collector.snapshot()),
            }
        }
        debug!("Report task stopped");
    })
}
