//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger and the lattice_* macros.

use crate::error::Error;
use crate::log::{self, Logger, LogEntry, LogSeverity, DefaultLogger};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

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
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_creation_with_file_line() {
    let entry = LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "lattice::HandlePool".to_string(),
        message: "no free handle".to_string(),
        file: Some("handle_pool.rs"),
        line: Some(42),
    };

    assert_eq!(entry.severity, LogSeverity::Error);
    assert_eq!(entry.source, "lattice::HandlePool");
    assert_eq!(entry.file, Some("handle_pool.rs"));
    assert_eq!(entry.line, Some(42));
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_all_severities() {
    let logger = DefaultLogger;
    let timestamp = SystemTime::now();

    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        logger.log(&LogEntry {
            severity,
            timestamp,
            source: "test".to_string(),
            message: format!("{:?} message", severity),
            file: None,
            line: None,
        });
        logger.log(&LogEntry {
            severity,
            timestamp,
            source: "test".to_string(),
            message: format!("{:?} message with location", severity),
            file: Some("test.rs"),
            line: Some(7),
        });
    }
}

#[test]
fn test_logger_trait_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();
}

// ============================================================================
// MACRO TESTS (global logger, serialized)
// ============================================================================

struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    log::set_logger(CaptureLogger { entries: entries.clone() });
    entries
}

fn entries_from(entries: &Arc<Mutex<Vec<LogEntry>>>, source: &str) -> Vec<LogEntry> {
    entries
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.source == source)
        .cloned()
        .collect()
}

#[test]
#[serial]
fn test_macros_route_to_custom_logger() {
    let entries = capture();

    crate::lattice_info!("test::macros", "frame {}", 3);
    crate::lattice_warn!("test::macros", "unit {} skipped", "rect");
    crate::lattice_error!("test::macros", "fatal");

    let captured = entries_from(&entries, "test::macros");
    log::reset_logger();

    assert_eq!(captured.len(), 3);
    assert_eq!(captured[0].severity, LogSeverity::Info);
    assert_eq!(captured[0].message, "frame 3");
    assert!(captured[0].file.is_none());
    assert_eq!(captured[1].message, "unit rect skipped");
    assert_eq!(captured[2].severity, LogSeverity::Error);
    assert!(captured[2].file.is_some());
    assert!(captured[2].line.is_some());
}

#[test]
#[serial]
fn test_lattice_err_builds_backend_error() {
    let entries = capture();

    let err = crate::lattice_err!("test::err", "bad value {}", 9);

    let captured = entries_from(&entries, "test::err");
    log::reset_logger();

    assert!(matches!(err, Error::BackendError(ref m) if m == "bad value 9"));
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Error);
}

#[test]
#[serial]
fn test_lattice_bail_returns_early() {
    fn check(value: u32) -> crate::error::Result<u32> {
        if value == 0 {
            crate::lattice_bail!("test::bail", "value must be non-zero");
        }
        Ok(value)
    }

    let entries = capture();
    let ok = check(2);
    let failed = check(0);
    let captured = entries_from(&entries, "test::bail");
    log::reset_logger();

    assert_eq!(ok.unwrap(), 2);
    assert!(failed.is_err());
    assert_eq!(captured.len(), 1);
}

#[test]
#[serial]
fn test_lattice_fail_logs_typed_error() {
    let entries = capture();

    let err = crate::lattice_fail!("test::fail", Error::NodeNotFound("view".to_string()));

    let captured = entries_from(&entries, "test::fail");
    log::reset_logger();

    assert!(matches!(err, Error::NodeNotFound(_)));
    assert_eq!(captured.len(), 1);
    assert!(captured[0].message.contains("view"));
}
