#![allow(dead_code)]
//! Headless test utilities shared by the integration tests
//!
//! Every test builds its own `HeadlessDevice`, so tests stay independent and
//! can inspect device state (bindings, uploaded bytes, image counts) directly.

use galaxy_3d_gpu::galaxy3d::{
    Config, GraphicsDevice, HeadlessDevice, HeadlessDeviceConfig, RenderContext,
};
use galaxy_3d_gpu::galaxy3d::log::{LogEntry, LogSeverity, Logger};
use std::sync::{Arc, Mutex};

/// Headless device plus the same device as a trait object
pub fn create_test_device() -> (Arc<HeadlessDevice>, Arc<dyn GraphicsDevice>) {
    let headless = Arc::new(HeadlessDevice::default());
    let device: Arc<dyn GraphicsDevice> = headless.clone();
    (headless, device)
}

/// Headless device limited to `bytes` of memory
pub fn create_budgeted_device(bytes: u64) -> (Arc<HeadlessDevice>, Arc<dyn GraphicsDevice>) {
    let headless = Arc::new(HeadlessDevice::new(HeadlessDeviceConfig {
        memory_budget: Some(bytes),
        ..Default::default()
    }));
    let device: Arc<dyn GraphicsDevice> = headless.clone();
    (headless, device)
}

pub fn create_test_context(frames_in_flight: u32) -> (Arc<HeadlessDevice>, RenderContext) {
    let (headless, device) = create_test_device();
    let config = Config {
        frames_in_flight,
        app_name: "Galaxy3D Integration Tests".to_string(),
        ..Default::default()
    };
    let context = RenderContext::new(device, config).expect("Failed to create render context");
    (headless, context)
}

/// Logger that keeps every entry for later assertions
pub struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLogger {
    pub fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

/// Messages captured at exactly `severity`
pub fn messages_at(entries: &Arc<Mutex<Vec<LogEntry>>>, severity: LogSeverity) -> Vec<String> {
    entries
        .lock()
        .unwrap()
        .iter()
        .filter(|entry| entry.severity == severity)
        .map(|entry| entry.message.clone())
        .collect()
}
