//! Integration tests for Engine logging system
//!
//! These tests swap the global logger, so they run serially.
//!
//! Run with: cargo test --test logging_integration_tests

mod headless_test_utils;

use galaxy_3d_gpu::galaxy3d::{BufferLayout, Engine, FieldDesc, FieldType, UniformBuffer};
use galaxy_3d_gpu::galaxy3d::log::LogSeverity;
use headless_test_utils::{create_test_device, messages_at, CaptureLogger};
use serial_test::serial;

fn teardown() {
    Engine::reset_logger();
    Engine::set_min_severity(LogSeverity::Debug);
}

// ============================================================================
// LOGGER TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger() {
    let (logger, entries) = CaptureLogger::new();
    Engine::set_logger(logger);

    Engine::log(LogSeverity::Info, "test::module", "Test info message".to_string());
    Engine::log(LogSeverity::Warn, "test::module", "Test warning message".to_string());
    Engine::log_detailed(LogSeverity::Error, "test::module", "Test error message".to_string(), "file.rs", 42);

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 3);
        assert_eq!(captured[0].source, "test::module");
        assert_eq!(captured[2].file, Some("file.rs"));
        assert_eq!(captured[2].line, Some(42));
    }

    teardown();
}

#[test]
#[serial]
fn test_integration_min_severity_filters_entries() {
    let (logger, entries) = CaptureLogger::new();
    Engine::set_logger(logger);
    Engine::set_min_severity(LogSeverity::Warn);

    Engine::log(LogSeverity::Debug, "test::module", "hidden".to_string());
    Engine::log(LogSeverity::Warn, "test::module", "shown".to_string());

    assert_eq!(entries.lock().unwrap().len(), 1);
    assert_eq!(Engine::min_severity(), LogSeverity::Warn);

    teardown();
}

// ============================================================================
// CRATE LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_contract_violation_is_logged_as_error() {
    let (_headless, device) = create_test_device();
    let layout = BufferLayout::new(&[FieldDesc::new("Value", FieldType::Float)]);
    let mut buffer = UniformBuffer::create(device, &layout, 0).unwrap();

    let (logger, entries) = CaptureLogger::new();
    Engine::set_logger(logger);

    assert!(buffer.set_data(&[0u8; 8], 0).is_err());

    let errors = entries
        .lock()
        .unwrap()
        .iter()
        .filter(|entry| entry.severity == LogSeverity::Error)
        .cloned()
        .collect::<Vec<_>>();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].source, "galaxy3d::UniformBuffer");
    assert!(errors[0].file.is_some());

    teardown();
}

#[test]
#[serial]
fn test_integration_unknown_buffer_variable_is_silent() {
    let (_headless, device) = create_test_device();
    let layout = BufferLayout::new(&[FieldDesc::new("Value", FieldType::Float)]);
    let mut buffer = UniformBuffer::create(device, &layout, 0).unwrap();

    let (logger, entries) = CaptureLogger::new();
    Engine::set_logger(logger);
    Engine::set_min_severity(LogSeverity::Trace);

    buffer.set_variable("Missing", &[1, 2, 3, 4]).unwrap();

    assert!(entries.lock().unwrap().is_empty());
    assert!(messages_at(&entries, LogSeverity::Warn).is_empty());

    teardown();
}
