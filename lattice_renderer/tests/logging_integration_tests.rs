//! Integration tests for renderer logging
//!
//! These tests install a capturing logger and check what the renderer
//! reports while drawing on the headless backend.
//! The logger is global, so every test is serialized.
//!
//! Run with: cargo test --test logging_integration_tests


use std::sync::{Arc, Mutex};
use headless_test_utils::*;
use lattice_renderer::lattice::log::{LogEntry, LogSeverity, Logger};
use lattice_renderer::lattice::scene::{RenderTargetNode, ViewNode};
use lattice_renderer::log::{reset_logger, set_logger};
use lattice_renderer::lattice_warn;
use serial_test::serial;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn messages(entries: &Arc<Mutex<Vec<LogEntry>>>, severity: LogSeverity, source: &str) -> Vec<String> {
    entries
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.severity == severity && e.source == source)
        .map(|e| e.message.clone())
        .collect()
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger_receives_macros() {
    let (test_logger, entries) = TestLogger::new();
    set_logger(test_logger);

    lattice_warn!("test::module", "value {} out of range", 7);

    let captured = entries.lock().unwrap().clone();
    reset_logger();

    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Warn);
    assert_eq!(captured[0].source, "test::module");
    assert_eq!(captured[0].message, "value 7 out of range");
}

#[test]
#[serial]
fn test_integration_skipped_unit_is_logged() {
    let (test_logger, entries) = TestLogger::new();
    set_logger(test_logger);

    let (mut renderer, _controller) = create_test_renderer();
    build_quad_scene(&mut renderer, None, [0.0, 0.0, 1.0, 1.0]);
    renderer.view_mut("main").unwrap().add_unit("ghost_unit");
    renderer.update(0).unwrap();
    renderer.draw(0).unwrap();
    drop(renderer);

    let warnings = messages(&entries, LogSeverity::Warn, "lattice::ViewScheduler");
    reset_logger();

    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("'ghost_unit'"));
    assert!(warnings[0].contains("NotADrawUnit"));
}

#[test]
#[serial]
fn test_integration_missing_render_target_is_logged() {
    let (test_logger, entries) = TestLogger::new();
    set_logger(test_logger);

    let (mut renderer, _controller) = create_test_renderer();
    let mut view = ViewNode::new("orphan", 32, 32).unwrap();
    view.set_render_target(Some("nowhere"));
    renderer.set_node(view).unwrap();
    renderer.update(0).unwrap();
    renderer.draw(0).unwrap();
    drop(renderer);

    let warnings = messages(&entries, LogSeverity::Warn, "lattice::ViewScheduler");
    reset_logger();

    assert_eq!(warnings, vec!["View 'orphan': render target 'nowhere' is not available; skipped".to_string()]);
}

#[test]
#[serial]
fn test_integration_shader_failure_is_logged_once() {
    let (test_logger, entries) = TestLogger::new();
    set_logger(test_logger);

    let (mut renderer, _controller) = create_test_renderer();
    renderer.set_node(quad_vertices("quad")).unwrap();
    let mut unit = quad_unit("broken_unit", "quad", None);
    unit.set_shader("missing.hlsl");
    renderer.set_node(unit).unwrap();
    for frame_id in 0..3 {
        renderer.update(frame_id).unwrap();
        renderer.draw(frame_id).unwrap();
    }
    drop(renderer);

    let errors = messages(&entries, LogSeverity::Error, "lattice::UpdatePhase");
    reset_logger();

    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("missing.hlsl"));
}

#[test]
#[serial]
fn test_integration_startup_names_application() {
    let (test_logger, entries) = TestLogger::new();
    set_logger(test_logger);

    let (renderer, _controller) = create_test_renderer();
    drop(renderer);

    let infos = messages(&entries, LogSeverity::Info, "lattice::SceneRenderer");
    reset_logger();

    assert_eq!(infos, vec!["'lattice integration' ready (2 frames in flight)".to_string()]);
}

#[test]
#[serial]
fn test_integration_unit_sampling_view_target_is_logged() {
    let (test_logger, entries) = TestLogger::new();
    set_logger(test_logger);

    let (mut renderer, _controller) = create_test_renderer();
    renderer.set_node(RenderTargetNode::new("rt", 32, 32).unwrap()).unwrap();
    renderer.set_node(quad_vertices("quad")).unwrap();
    renderer.set_node(quad_unit("feedback", "quad", Some("rt"))).unwrap();
    let mut view = ViewNode::new("off", 32, 32).unwrap();
    view.set_render_target(Some("rt"));
    view.add_unit("feedback");
    renderer.set_node(view).unwrap();
    renderer.update(0).unwrap();
    renderer.draw(0).unwrap();
    drop(renderer);

    let warnings = messages(&entries, LogSeverity::Warn, "lattice::ViewScheduler");
    reset_logger();

    assert_eq!(warnings, vec!["View 'off': unit 'feedback' skipped (SamplesViewTarget)".to_string()]);
}
