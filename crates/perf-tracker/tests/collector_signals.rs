//! Integration tests for the timing collector
//!
//! These tests drive a collector against the simulated host and check how
//! manual timing and passively delivered entries end up in the record.

use perf_tracker::host::{Capabilities, PerformanceEntry, SimulatedHost, FIRST_CONTENTFUL_PAINT};
use perf_tracker::metrics::{PerformanceMetrics, TimingCollector};
use pretty_assertions::assert_eq;
use std::rc::Rc;

#[test]
fn test_fresh_collector_is_empty() {
    let host = Rc::new(SimulatedHost::new());
    let mut collector = TimingCollector::new(host);

    assert_eq!(collector.metrics(), PerformanceMetrics::default());
    assert!(collector.is_observing());
}

#[test]
fn test_interval_feeds_render_and_total_time() {
    let host = Rc::new(SimulatedHost::new());
    let mut collector = TimingCollector::new(host.clone());

    collector.start_measuring("list");
    host.advance(7.5);
    assert_eq!(collector.end_measuring("list"), 7.5);

    let metrics = collector.metrics();
    assert_eq!(metrics.render_time, 7.5);
    // measure entry arrives through the observer
    assert_eq!(metrics.total_time, 7.5);
    assert!(host.has_mark("list-start"));
    assert!(host.has_mark("list-end"));
}

#[test]
fn test_end_without_start_measures_from_zero() {
    let host = Rc::new(SimulatedHost::new());
    let mut collector = TimingCollector::new(host.clone());

    host.advance(5.0);
    assert_eq!(collector.end_measuring("x"), 5.0);
    assert_eq!(collector.metrics().render_time, 5.0);
}

#[test]
fn test_restart_resets_interval_start() {
    let host = Rc::new(SimulatedHost::new());
    let mut collector = TimingCollector::new(host.clone());

    collector.start_measuring("list");
    host.advance(10.0);
    collector.start_measuring("list");
    host.advance(4.0);

    assert_eq!(collector.end_measuring("list"), 4.0);
    // the measure spans the latest start mark too
    assert_eq!(collector.metrics().total_time, 4.0);
}

#[test]
fn test_end_mark_without_measure_support() {
    let host = Rc::new(SimulatedHost::with_capabilities(Capabilities {
        measures: false,
        ..Capabilities::all()
    }));
    let mut collector = TimingCollector::new(host.clone());

    collector.start_measuring("list");
    host.advance(3.0);
    collector.end_measuring("list");

    assert!(host.has_mark("list-start"));
    assert!(host.has_mark("list-end"));
    assert_eq!(collector.metrics().total_time, 0.0);
}

#[test]
fn test_interval_without_marks() {
    let host = Rc::new(SimulatedHost::with_capabilities(Capabilities {
        marks: false,
        measures: false,
        ..Capabilities::all()
    }));
    let mut collector = TimingCollector::new(host.clone());

    collector.start_measuring("list");
    host.advance(3.0);
    collector.end_measuring("list");

    let metrics = collector.metrics();
    assert_eq!(metrics.render_time, 3.0);
    assert_eq!(metrics.total_time, 0.0);
    assert!(!host.has_mark("list-start"));
}

#[test]
fn test_paint_and_layout_shift_signals() {
    let host = Rc::new(SimulatedHost::new());
    let mut collector = TimingCollector::new(host.clone());

    host.emit(PerformanceEntry::paint("first-paint", 40.0));
    host.emit(PerformanceEntry::paint(FIRST_CONTENTFUL_PAINT, 55.0));
    host.emit(PerformanceEntry::paint(FIRST_CONTENTFUL_PAINT, 60.0));
    host.emit(PerformanceEntry::layout_shift(70.0, Some(1.5)));
    host.emit(PerformanceEntry::layout_shift(71.0, None));
    host.emit(PerformanceEntry::layout_shift(72.0, Some(0.5)));

    let metrics = collector.metrics();
    assert_eq!(metrics.paint_time, 60.0);
    assert_eq!(metrics.layout_time, 2.0);
}

#[test]
fn test_every_collector_receives_each_entry() {
    let host = Rc::new(SimulatedHost::new());
    let mut first = TimingCollector::new(host.clone());
    let mut second = TimingCollector::new(host.clone());

    host.emit(PerformanceEntry::measure("hydrate", 0.0, 4.0));

    assert_eq!(first.metrics().total_time, 4.0);
    assert_eq!(second.metrics().total_time, 4.0);
}

#[tokio::test]
async fn test_reset_then_repopulate() {
    let host = Rc::new(
        SimulatedHost::new()
            .with_heap_used(2 * 1024 * 1024)
            .with_layout_cost(0.25),
    );
    let mut collector = TimingCollector::new(host.clone());

    collector.start_measuring("grid");
    host.advance(9.0);
    collector.end_measuring("grid");
    collector.get_all_metrics().await;

    collector.reset();
    assert_eq!(collector.metrics(), PerformanceMetrics::default());

    let metrics = collector.get_all_metrics().await;
    assert_eq!(metrics.render_time, 0.0);
    assert_eq!(metrics.total_time, 0.0);
    assert_eq!(metrics.memory_usage, 2.0);
    assert_eq!(metrics.style_recalc_time, 0.25);
}

#[tokio::test]
async fn test_degraded_host_still_times() {
    let host = Rc::new(SimulatedHost::new().with_failing_observer());
    let mut collector = TimingCollector::new(host.clone());
    assert!(!collector.is_observing());

    collector.start_measuring("list");
    host.advance(4.0);
    collector.end_measuring("list");
    host.emit(PerformanceEntry::layout_shift(1.0, Some(3.0)));

    let metrics = collector.get_all_metrics().await;
    assert_eq!(metrics.render_time, 4.0);
    assert_eq!(metrics.layout_time, 0.0);
    assert_eq!(metrics.total_time, 0.0);
}

#[test]
fn test_disconnect_is_idempotent() {
    let host = Rc::new(SimulatedHost::new());
    let mut collector = TimingCollector::new(host.clone());
    assert_eq!(host.subscriber_count(), 1);

    collector.disconnect();
    collector.disconnect();
    assert!(!collector.is_observing());

    host.emit(PerformanceEntry::measure("late", 0.0, 10.0));
    assert_eq!(collector.metrics().total_time, 0.0);
    assert_eq!(host.subscriber_count(), 0);
}

#[test]
fn test_disconnect_without_subscription() {
    let host = Rc::new(SimulatedHost::with_capabilities(Capabilities::none()));
    let mut collector = TimingCollector::new(host);

    assert!(!collector.is_observing());
    collector.disconnect();
    assert!(!collector.is_observing());
}
