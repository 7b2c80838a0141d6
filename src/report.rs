//! Report output
//!
//! [`ReportSink`] is the append-only text stream shared by the report and
//! alert tasks. Rendering of [`Summary`] lives here as its `Display` impl.

use crate::constants::report::HEADER_TIME_FORMAT;
use crate::metrics::Summary;
use parking_lot::Mutex;
use std::fmt::{self, Display};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// Shared, line-atomic writer for reports and alerts
///
/// Each `write_line` holds the lock for the whole line, so output from the
/// two timers never interleaves mid-line.
#[derive(Clone)]
pub struct ReportSink {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl ReportSink {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
        }
    }

    /// Sink writing to standard output
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Append `item` followed by a newline
    ///
    /// Write failures are logged and otherwise ignored; output problems never
    /// stop aggregation.
    pub fn write_line(&self, item: impl Display) {
        let mut out = self.out.lock();
        if let Err(e) = writeln!(out, "{item}").and_then(|()| out.flush()) {
            tracing::warn!(error = %e, "Failed to write report output");
        }
    }
}

impl fmt::Debug for ReportSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportSink").finish_non_exhaustive()
    }
}

/// Format a window duration compactly, e.g. `2m0s` or `750ms`
#[must_use]
pub fn format_window(window: Duration) -> String {
    let secs = window.as_secs();
    if secs == 0 {
        return format!("{}ms", window.as_millis());
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "===== SUMMARY [{}] =================>",
            self.timestamp.format(HEADER_TIME_FORMAT)
        )?;

        let width = self
            .top_sections
            .iter()
            .map(|s| s.section.len())
            .max()
            .unwrap_or(0)
            .max("Section".len());
        writeln!(f, "{:<width$}  Hits", "Section")?;
        writeln!(f, "{:-<width$}  ----", "")?;
        for section in &self.top_sections {
            writeln!(f, "{:<width$}  {}", section.section, section.hits)?;
        }

        writeln!(f, "Total hits:\t\t{}", self.total_hits)?;
        writeln!(f, "Unique visitors:\t{}", self.distinct_ips)?;
        writeln!(f, "Hits/s:\t\t\t{:.2}", self.latest_rate())?;
        match self.avg_hits {
            Some(avg) => writeln!(f, "Mean hits ({}):\t{:.2}", format_window(self.window), avg)?,
            None => writeln!(f, "Mean hits ({}):\tn/a", format_window(self.window))?,
        }
        if self.skipped_lines > 0 {
            writeln!(f, "Skipped lines:\t\t{}", self.skipped_lines)?;
        }

        writeln!(f, "------- Responses -----------------------")?;
        let s = &self.status_freq;
        writeln!(
            f,
            "1xx: {}, 2xx: {}, 3xx: {}, 4xx: {}, 5xx: {}",
            s.informational, s.successful, s.redirection, s.client_error, s.server_error
        )?;
        writeln!(f, "Min response size:\t{}B", self.sizes.min)?;
        writeln!(f, "Median response size:\t{}B", self.sizes.median)?;
        writeln!(f, "Max response size:\t{}B", self.sizes.max)?;
        writeln!(f, "p99 response size:\t{}B", self.sizes.p99)?;
        writeln!(f, "Mean response size:\t{:.2}B", self.sizes.mean)?;
        writeln!(f, "Response size std dev:\t{:.2}B", self.sizes.stddev)?;
        write!(f, "-----------------------------------------")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{SectionHits, SizeDistribution, StatusFreq};
    use chrono::Local;

    /// Writer that appends into a shared buffer
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn summary() -> Summary {
        Summary {
            timestamp: Local::now(),
            total_hits: 3,
            skipped_lines: 0,
            top_sections: vec![
                SectionHits {
                    section: "/pages".into(),
                    hits: 2,
                },
                SectionHits {
                    section: "/users".into(),
                    hits: 1,
                },
            ],
            distinct_ips: 2,
            sizes: SizeDistribution::default(),
            status_freq: StatusFreq {
                successful: 3,
                ..StatusFreq::default()
            },
            hits_per_quantum: 1,
            quantum: Duration::from_secs(1),
            avg_hits: None,
            window: Duration::from_secs(120),
        }
    }

    #[test]
    fn test_format_window() {
        assert_eq!(format_window(Duration::from_secs(120)), "2m0s");
        assert_eq!(format_window(Duration::from_secs(45)), "45s");
        assert_eq!(format_window(Duration::from_secs(3725)), "1h2m5s");
        assert_eq!(format_window(Duration::from_millis(750)), "750ms");
    }

    #[test]
    fn test_summary_rendering() {
        let text = summary().to_string();

        assert!(text.starts_with("===== SUMMARY ["));
        let pages = text.find("/pages").unwrap();
        let users = text.find("/users").unwrap();
        assert!(pages < users, "sections not in descending order");
        assert!(text.contains("Unique visitors:\t2"));
        assert!(text.contains("Hits/s:\t\t\t1.00"));
        assert!(text.contains("Mean hits (2m0s):\tn/a"));
        assert!(text.contains("1xx: 0, 2xx: 3, 3xx: 0, 4xx: 0, 5xx: 0"));
        assert!(!text.contains("Skipped lines"));
    }

    #[test]
    fn test_summary_rendering_with_average() {
        let text = Summary {
            avg_hits: Some(12.346),
            skipped_lines: 4,
            ..summary()
        }
        .to_string();
        assert!(text.contains("Mean hits (2m0s):\t12.35"));
        assert!(text.contains("Skipped lines:\t\t4"));
    }

    #[test]
    fn test_latest_rate_scaled_by_quantum() {
        let text = Summary {
            hits_per_quantum: 3,
            quantum: Duration::from_millis(250),
            ..summary()
        }
        .to_string();
        // 3 hits in 250ms is 12 hits/s
        assert!(text.contains("Hits/s:\t\t\t12.00"));
    }

    #[test]
    fn test_sink_appends_lines() {
        let buf = SharedBuf::default();
        let sink = ReportSink::new(Box::new(buf.clone()));
        sink.write_line("first");
        sink.clone().write_line(format_args!("second {}", 2));

        let out = String::from_utf8(buf.0.lock().clone()).unwrap();
        assert_eq!(out, "first\nsecond 2\n");
    }
}
