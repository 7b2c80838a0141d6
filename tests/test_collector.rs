//! Tests for the statistics collector fed through the log parser
//!
//! Covers section ranking, status class accounting, size histogram rotation
//! and snapshot consistency.

use chrono::{Local, TimeZone};
use httpmon::{Collector, LogParser, MonitorConfig};

fn collector_with(config: &MonitorConfig) -> Collector {
    Collector::new(config).unwrap()
}

fn line(path: &str, status: &str, size: &str) -> String {
    format!(r#"10.0.0.1 - - [09/May/2018:16:00:39 +0000] "GET {path} HTTP/1.0" {status} {size}"#)
}

/// Feed lines the way the ingestion loop does
fn feed(collector: &Collector, lines: &[String]) {
    let parser = LogParser::new();
    for line in lines {
        match parser.parse(line) {
            Some(record) => collector.process(&record),
            None => collector.record_skipped(),
        }
    }
}

/// Test three requests rank `/pages` above `/users`
#[test]
fn test_top_sections_three_lines() {
    let collector = collector_with(&MonitorConfig::for_file("access.log"));
    feed(
        &collector,
        &[
            line("/pages/1", "200", "10"),
            line("/pages/2", "200", "10"),
            line("/users/5", "200", "10"),
        ],
    );

    let top = collector.top_sections();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].section, "/pages");
    assert_eq!(top[0].hits, 2);
    assert_eq!(top[1].section, "/users");
    assert_eq!(top[1].hits, 1);
}

/// Test top sections are capped at the configured count
#[test]
fn test_top_sections_bounded() {
    let mut config = MonitorConfig::for_file("access.log");
    config.sections = 2;
    let collector = collector_with(&config);

    let lines: Vec<String> = ["/a/1", "/a/2", "/a/3", "/b/1", "/b/2", "/c/1"]
        .iter()
        .map(|p| line(p, "200", "1"))
        .collect();
    feed(&collector, &lines);

    let top = collector.top_sections();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].section, "/a");
    assert_eq!(top[1].section, "/b");
}

/// Test status class counts add up to processed minus skipped lines
#[test]
fn test_status_histogram_sum_matches_processed() {
    let collector = collector_with(&MonitorConfig::for_file("access.log"));
    let lines = vec![
        line("/a/1", "101", "0"),
        line("/a/2", "204", "0"),
        line("/a/3", "302", "0"),
        "not a log line".to_string(),
        line("/a/4", "404", "0"),
        line("/a/5", "503", "0"),
        String::from(r#"10.0.0.1 - - [garbage"#),
        line("/a/6", "200", "0"),
    ];
    feed(&collector, &lines);

    let summary = collector.snapshot();
    assert_eq!(summary.skipped_lines, 2);
    assert_eq!(summary.total_hits, 6);
    assert_eq!(
        summary.status_freq.total(),
        summary.lines_seen() - summary.skipped_lines
    );
    assert_eq!(summary.status_freq.informational, 1);
    assert_eq!(summary.status_freq.successful, 2);
    assert_eq!(summary.status_freq.redirection, 1);
    assert_eq!(summary.status_freq.client_error, 1);
    assert_eq!(summary.status_freq.server_error, 1);
}

/// Test dash status and size parse as zero and leave the histogram alone
#[test]
fn test_dash_fields() {
    let collector = collector_with(&MonitorConfig::for_file("access.log"));
    feed(&collector, &[line("/a/1", "-", "-")]);

    let summary = collector.snapshot();
    assert_eq!(summary.total_hits, 1);
    assert_eq!(summary.status_freq.total(), 0);
    assert_eq!(summary.sizes.count, 1);
    assert_eq!(summary.sizes.max, 0);
}

/// Test size histogram rotation keeps earlier values in the merged view
#[test]
fn test_size_rotation_preserves_merged_values() {
    let mut config = MonitorConfig::for_file("access.log");
    config.size_rotation_threshold = 10;
    let collector = collector_with(&config);

    let lines: Vec<String> = (1..=10)
        .map(|i| line("/a/b", "200", &(i * 100).to_string()))
        .collect();
    feed(&collector, &lines);

    // Rotated on the tenth record
    assert_eq!(collector.active_size_bucket_len(), 0);
    let summary = collector.snapshot();
    assert_eq!(summary.sizes.count, 10);
    assert_eq!(summary.sizes.min, 100);
    assert!(summary.sizes.max >= 999 && summary.sizes.max <= 1001);

    feed(&collector, &[line("/a/b", "200", "50")]);
    assert_eq!(collector.active_size_bucket_len(), 1);
    assert_eq!(collector.snapshot().sizes.count, 11);
}

/// Test two snapshots with no processing in between are identical
#[test]
fn test_snapshot_idempotent() {
    let collector = collector_with(&MonitorConfig::for_file("access.log"));
    feed(
        &collector,
        &[
            line("/pages/1", "200", "120"),
            line("/users/2", "500", "3000"),
        ],
    );

    let at = Local.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(collector.snapshot_at(at), collector.snapshot_at(at));
}

/// Test distinct remote addresses are estimated
#[test]
fn test_distinct_visitors() {
    let collector = collector_with(&MonitorConfig::for_file("access.log"));
    let parser = LogParser::new();
    for i in 0..50 {
        let raw = format!(
            r#"192.168.0.{i} - - [09/May/2018:16:00:39 +0000] "GET /a HTTP/1.0" 200 1"#
        );
        collector.process(&parser.parse(&raw).unwrap());
    }
    // Repeat visitors do not count twice
    for i in 0..50 {
        let raw = format!(
            r#"192.168.0.{i} - - [09/May/2018:16:00:39 +0000] "GET /a HTTP/1.0" 200 1"#
        );
        collector.process(&parser.parse(&raw).unwrap());
    }

    let distinct = collector.snapshot().distinct_ips;
    assert!((48..=52).contains(&distinct), "estimate {distinct}");
}

/// Test concurrent readers see whole records only
#[test]
fn test_concurrent_snapshots_consistent() {
    let collector = collector_with(&MonitorConfig::for_file("access.log"));
    let writer = {
        let collector = collector.clone();
        std::thread::spawn(move || {
            let lines: Vec<String> = (0..2000).map(|_| line("/x/y", "200", "10")).collect();
            feed(&collector, &lines);
        })
    };

    for _ in 0..200 {
        let summary = collector.snapshot();
        assert_eq!(summary.status_freq.total(), summary.total_hits);
        assert_eq!(summary.sizes.count, summary.total_hits);
    }
    writer.join().unwrap();
    assert_eq!(collector.total_hits(), 2000);
}
