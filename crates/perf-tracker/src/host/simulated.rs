//! Deterministic host for tests and reproducible demos
//!
//! [`SimulatedHost`] never reads a real clock. Time moves only when the
//! caller advances it or when an operation with a configured cost runs
//! (a layout probe, an animation frame, a settle delay). Entries can be
//! injected with [`SimulatedHost::emit`] to stand in for paint and
//! layout-shift signals a browser would deliver on its own.
//!
//! # Example
//!
//! ```
//! use perf_tracker::host::{PerformanceHost, SimulatedHost};
//!
//! let host = SimulatedHost::new();
//! let start = host.now();
//! host.advance(12.5);
//! assert_eq!(host.now() - start, 12.5);
//! ```

use futures::future::{self, FutureExt, LocalBoxFuture};
use std::cell::{Cell, RefCell};
use std::time::Duration;

use super::timeline::Timeline;
use super::{Capabilities, EntryReceiver, EntryType, PerformanceEntry, PerformanceHost};
use crate::error::TrackerError;

/// Default animation frame interval (60 Hz)
pub const DEFAULT_FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;

/// Host with a hand-driven clock
pub struct SimulatedHost {
    capabilities: Capabilities,
    clock: Cell<f64>,
    heap_used: Cell<u64>,
    layout_cost: Cell<f64>,
    frame_interval: Cell<f64>,
    fail_observe: Cell<bool>,
    layout_probes: Cell<usize>,
    timeline: RefCell<Timeline>,
}

impl SimulatedHost {
    /// Host with every capability, clock at zero
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::all())
    }

    /// Host advertising only the given capabilities
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            clock: Cell::new(0.0),
            heap_used: Cell::new(0),
            layout_cost: Cell::new(0.0),
            frame_interval: Cell::new(DEFAULT_FRAME_INTERVAL_MS),
            fail_observe: Cell::new(false),
            layout_probes: Cell::new(0),
            timeline: RefCell::new(Timeline::default()),
        }
    }

    /// Set the heap usage sample in bytes
    pub fn with_heap_used(self, bytes: u64) -> Self {
        self.heap_used.set(bytes);
        self
    }

    /// Set how far the clock moves during each layout probe
    pub fn with_layout_cost(self, ms: f64) -> Self {
        self.layout_cost.set(ms);
        self
    }

    /// Set how far the clock moves per animation frame
    pub fn with_frame_interval(self, ms: f64) -> Self {
        self.frame_interval.set(ms);
        self
    }

    /// Make every `observe` call fail even though the capability is set
    pub fn with_failing_observer(self) -> Self {
        self.fail_observe.set(true);
        self
    }

    /// Move the clock forward
    pub fn advance(&self, ms: f64) {
        self.clock.set(self.clock.get() + ms);
    }

    /// Change the heap usage sample
    pub fn set_heap_used(&self, bytes: u64) {
        self.heap_used.set(bytes);
    }

    /// Deliver an entry to every live subscriber interested in its type
    pub fn emit(&self, entry: PerformanceEntry) {
        self.timeline.borrow_mut().dispatch(entry);
    }

    /// Number of subscriptions whose receiver is still alive
    pub fn subscriber_count(&self) -> usize {
        self.timeline.borrow().subscriber_count()
    }

    /// Whether a mark with this name has been recorded
    pub fn has_mark(&self, name: &str) -> bool {
        self.timeline.borrow().has_mark(name)
    }

    /// Number of layout probes run so far
    pub fn layout_probes(&self) -> usize {
        self.layout_probes.get()
    }
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceHost for SimulatedHost {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn now(&self) -> f64 {
        self.clock.get()
    }

    fn mark(&self, name: &str) {
        self.timeline.borrow_mut().mark(name, self.clock.get());
    }

    fn measure(&self, name: &str, start_mark: &str, end_mark: &str) {
        self.timeline.borrow_mut().measure(name, start_mark, end_mark);
    }

    fn observe(&self, entry_types: &[EntryType]) -> Result<EntryReceiver, TrackerError> {
        if !self.capabilities.observer {
            return Err(TrackerError::ObserverUnsupported);
        }
        if self.fail_observe.get() {
            return Err(TrackerError::ObserverFailed(
                "simulated observer failure".to_string(),
            ));
        }
        Ok(self.timeline.borrow_mut().subscribe(entry_types))
    }

    fn heap_used_bytes(&self) -> u64 {
        self.heap_used.get()
    }

    fn force_layout(&self) {
        self.layout_probes.set(self.layout_probes.get() + 1);
        self.advance(self.layout_cost.get());
    }

    fn next_frame(&self) -> LocalBoxFuture<'static, f64> {
        self.advance(self.frame_interval.get());
        future::ready(self.clock.get()).boxed_local()
    }

    fn settle(&self, delay: Duration) -> LocalBoxFuture<'static, ()> {
        self.advance(delay.as_secs_f64() * 1000.0);
        future::ready(()).boxed_local()
    }
}
