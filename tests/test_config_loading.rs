//! Tests for config/loading.rs module
//!
//! Tests TOML loading, defaults for omitted fields and validation of the
//! loaded result.

use anyhow::Result;
use httpmon::config::load_config;
use httpmon::{MonitorConfig, MonitorError};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> Result<NamedTempFile> {
    let mut temp_file = NamedTempFile::new()?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.flush()?;
    Ok(temp_file)
}

/// Test loading from TOML file
#[test]
fn test_load_config_from_file() -> Result<()> {
    let temp_file = write_config(
        r#"
file = "/var/log/nginx/access.log"
sections = 8
reporting_interval = 5
alert_window = 60
alert_threshold = 25.5
quantum = 500
alert_check_quanta = 4
"#,
    )?;

    let config = load_config(temp_file.path())?;

    assert_eq!(config.file, PathBuf::from("/var/log/nginx/access.log"));
    assert_eq!(config.sections, 8);
    assert_eq!(config.reporting_interval, Duration::from_secs(5));
    assert_eq!(config.alert_window, Duration::from_secs(60));
    assert_eq!(config.alert_threshold, 25.5);
    assert_eq!(config.quantum, Duration::from_millis(500));
    assert_eq!(config.alert_interval(), Duration::from_secs(2));
    config.validate()?;

    Ok(())
}

/// Test omitted fields keep their defaults
#[test]
fn test_partial_file_uses_defaults() -> Result<()> {
    let temp_file = write_config("file = \"access.log\"\n")?;
    let config = load_config(temp_file.path())?;

    assert_eq!(config, MonitorConfig::for_file("access.log"));
    Ok(())
}

/// Test invalid TOML returns error
#[test]
fn test_invalid_toml_returns_error() -> Result<()> {
    let temp_file = write_config("this is not valid TOML [[[")?;
    let result = load_config(temp_file.path());

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Failed to parse"));

    Ok(())
}

/// Test wrongly typed value returns error
#[test]
fn test_wrong_type_returns_error() -> Result<()> {
    let temp_file = write_config("sections = \"five\"\n")?;
    assert!(load_config(temp_file.path()).is_err());
    Ok(())
}

/// Test missing file returns error
#[test]
fn test_missing_file_returns_error() {
    let result = load_config("/nonexistent/path.toml");

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Failed to read"));
}

/// Test the defaults for a given file form a valid config
#[test]
fn test_for_file_defaults() {
    let config = MonitorConfig::for_file("/var/log/access.log");

    assert_eq!(config.sections, 5);
    assert_eq!(config.reporting_interval, Duration::from_secs(10));
    assert_eq!(config.alert_window, Duration::from_secs(120));
    assert_eq!(config.alert_threshold, 10.0);
    assert_eq!(config.quantum, Duration::from_secs(1));
    assert!(config.reporting_enabled());
    assert!(config.validate().is_ok());
}

/// Test a loaded window shorter than its quantum fails validation
#[test]
fn test_loaded_window_shorter_than_quantum() -> Result<()> {
    let temp_file = write_config("file = \"a.log\"\nalert_window = 1\nquantum = 2000\n")?;
    let config = load_config(temp_file.path())?;

    let err = config.validate().unwrap_err();
    assert!(matches!(err, MonitorError::InvalidWindow { .. }));
    assert!(err.is_config());
    Ok(())
}

/// Test a loaded window needing too many quanta fails validation
#[test]
fn test_loaded_window_with_too_many_quanta() -> Result<()> {
    let temp_file =
        write_config("file = \"a.log\"\nalert_window = 1000000000000\nquantum = 1\n")?;
    let config = load_config(temp_file.path())?;

    assert!(matches!(
        config.validate(),
        Err(MonitorError::InvalidWindow { .. })
    ));
    Ok(())
}

/// Test zero reporting interval disables reporting
#[test]
fn test_zero_reporting_interval() -> Result<()> {
    let temp_file = write_config("file = \"a.log\"\nreporting_interval = 0\n")?;
    let config = load_config(temp_file.path())?;

    assert!(!config.reporting_enabled());
    assert!(config.validate().is_ok());
    Ok(())
}
