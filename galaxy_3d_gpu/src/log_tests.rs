//! Unit tests for log.rs
//!
//! Tests LogSeverity, LogEntry and DefaultLogger.

use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
use std::time::SystemTime;

fn entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "galaxy3d::UniformBuffer".to_string(),
        message: "uploaded 80 bytes".to_string(),
        file,
        line,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_labels_are_fixed_width() {
    let all = [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ];
    for severity in all {
        assert_eq!(severity.label().len(), 5);
    }
    assert_eq!(LogSeverity::Warn.label().trim(), "WARN");
}

#[test]
fn test_log_severity_u8_conversion() {
    let all = [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ];
    for severity in all {
        assert_eq!(LogSeverity::from_u8(severity.to_u8()), severity);
    }
    // Out-of-range values saturate to Error
    assert_eq!(LogSeverity::from_u8(200), LogSeverity::Error);
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_with_file_line() {
    let e = entry(LogSeverity::Error, Some("buffer_set.rs"), Some(12));

    assert_eq!(e.severity, LogSeverity::Error);
    assert_eq!(e.source, "galaxy3d::UniformBuffer");
    assert_eq!(e.file, Some("buffer_set.rs"));
    assert_eq!(e.line, Some(12));
}

#[test]
fn test_log_entry_clone() {
    let e = entry(LogSeverity::Info, None, None);
    let copy = e.clone();

    assert_eq!(copy.severity, e.severity);
    assert_eq!(copy.message, e.message);
    assert_eq!(copy.timestamp, e.timestamp);
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_all_severities() {
    let logger = DefaultLogger;
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        logger.log(&entry(severity, None, None));
        logger.log(&entry(severity, Some("file.rs"), Some(7)));
    }
}

#[test]
fn test_default_logger_file_without_line_is_ignored() {
    // Only a complete (file, line) pair is appended
    DefaultLogger.log(&entry(LogSeverity::Error, Some("file.rs"), None));
}

#[test]
fn test_logger_trait_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();

    let boxed: Box<dyn Logger> = Box::new(DefaultLogger);
    boxed.log(&entry(LogSeverity::Debug, None, None));
}
