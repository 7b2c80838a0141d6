//! HTTP access log records
//!
//! A [`RequestRecord`] is one parsed Common Log Format line. Records are
//! produced by [`LogParser`] and handed to the collector, which owns nothing
//! of them once `process` returns.

mod parser;
mod section;

pub use parser::{LogParser, RequestLine, RequestLineParser};
pub use section::section_key;

use chrono::{DateTime, FixedOffset};

/// One parsed access log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    /// IP address or hostname of the remote client
    pub remote_addr: String,
    /// RFC 1413 identity, empty when the log holds `-`
    pub identity: String,
    /// Authenticated user id, empty when the log holds `-`
    pub user_id: String,
    /// Time of the request, `None` when the date could not be parsed
    pub timestamp: Option<DateTime<FixedOffset>>,
    /// Raw request line, e.g. `GET /index.html HTTP/1.1`
    pub request: String,
    /// HTTP status code, 0 when absent or unparsable
    pub status: u16,
    /// Response size in bytes, 0 when absent or unparsable
    pub size: u64,
}
