//! Common Log Format parsing
//!
//! Patterns are compiled once per parser instance and owned by whichever
//! pipeline stage uses them.

use super::RequestRecord;
use chrono::DateTime;
use regex::Regex;

/// `host ident authuser [date] "request" status bytes`, optionally followed
/// by the combined format's referrer and user agent
const CLF_PATTERN: &str =
    r#"^(\S+) (\S+) (\S+) \[([\w:/]+\s[+\-]\d{4})\] "(.*)" (\d{3}|-) (\d+|-)( ".*" ".*")?"#;

/// `METHOD /path?query PROTOCOL`
const REQUEST_LINE_PATTERN: &str = r"(\S+)\s+([^?\s]+)((?:[?&][^&\s]+)*)\s+(HTTP/.*)";

/// Date layout inside the brackets, e.g. `10/Oct/2000:13:55:36 -0700`
const CLF_TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Placeholder used by CLF for absent fields
const PLACEHOLDER: &str = "-";

/// Parses raw log lines into [`RequestRecord`]s
#[derive(Debug, Clone)]
pub struct LogParser {
    line: Regex,
}

impl LogParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            line: Regex::new(CLF_PATTERN).expect("CLF pattern is valid"),
        }
    }

    /// Parse one line, or `None` if it is not in Common Log Format
    ///
    /// Sub-fields that fail to parse take their zero value instead of
    /// rejecting the line: an unparsable date gives `timestamp: None`, a `-`
    /// or overflowing status/size gives 0.
    #[must_use]
    pub fn parse(&self, line: &str) -> Option<RequestRecord> {
        let line = line.trim_end_matches(['\r', '\n']);
        let caps = self.line.captures(line)?;

        Some(RequestRecord {
            remote_addr: caps[1].to_string(),
            identity: placeholder_to_empty(&caps[2]),
            user_id: placeholder_to_empty(&caps[3]),
            timestamp: DateTime::parse_from_str(&caps[4], CLF_TIME_FORMAT).ok(),
            request: caps[5].to_string(),
            status: caps[6].parse().unwrap_or(0),
            size: caps[7].parse().unwrap_or(0),
        })
    }
}

impl Default for LogParser {
    fn default() -> Self {
        Self::new()
    }
}

fn placeholder_to_empty(field: &str) -> String {
    if field == PLACEHOLDER {
        String::new()
    } else {
        field.to_string()
    }
}

/// Components of an HTTP request line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLine<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub query: &'a str,
    pub protocol: &'a str,
}

/// Splits request lines such as `GET /index.html?x=1 HTTP/1.1`
#[derive(Debug, Clone)]
pub struct RequestLineParser {
    request: Regex,
}

impl RequestLineParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            request: Regex::new(REQUEST_LINE_PATTERN).expect("request line pattern is valid"),
        }
    }

    /// Split a request line, or `None` if it is malformed
    #[must_use]
    pub fn parse<'a>(&self, request: &'a str) -> Option<RequestLine<'a>> {
        let caps = self.request.captures(request)?;
        Some(RequestLine {
            method: caps.get(1)?.as_str(),
            path: caps.get(2)?.as_str(),
            query: caps.get(3).map_or("", |m| m.as_str()),
            protocol: caps.get(4)?.as_str(),
        })
    }
}

impl Default for RequestLineParser {
    fn default() -> Self {
        Self::new()
    }
}
