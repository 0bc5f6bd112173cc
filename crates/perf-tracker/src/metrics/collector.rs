//! Interval timing with passive signal absorption
//!
//! [`TimingCollector`] brackets a unit of work with
//! [`start_measuring`](TimingCollector::start_measuring) and
//! [`end_measuring`](TimingCollector::end_measuring), emitting the
//! `<label>-start` / `<label>-end` marks and the `<label>` measure when the
//! host supports User Timing.
//!
//! # How it works
//!
//! 1. On construction the collector subscribes to measure, paint and
//!    layout-shift entries (when the host has an observer)
//! 2. The host pushes entries into the subscription whenever it likes
//! 3. Pending entries are folded into the record each time a snapshot is
//!    taken, so their arrival order relative to start/end does not matter
//!
//! A host without an observer, or one whose observer fails, leaves the
//! signal-fed fields at zero. Manual timing keeps working.

use std::rc::Rc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, instrument, trace, warn};

use super::signals::{apply_entry, OBSERVED_ENTRY_TYPES};
use super::{PerformanceMetrics, BYTES_PER_MB};
use crate::host::{Capabilities, EntryReceiver, PerformanceHost};

/// Measures one labeled interval against a [`PerformanceHost`]
pub struct TimingCollector {
    host: Rc<dyn PerformanceHost>,
    capabilities: Capabilities,
    start_time: f64,
    end_time: f64,
    metrics: PerformanceMetrics,
    signals: Option<EntryReceiver>,
}

impl TimingCollector {
    /// Create a collector and subscribe to host signals
    pub fn new(host: Rc<dyn PerformanceHost>) -> Self {
        let capabilities = host.capabilities();
        let signals = if capabilities.observer {
            match host.observe(&OBSERVED_ENTRY_TYPES) {
                Ok(receiver) => Some(receiver),
                Err(e) => {
                    warn!("Performance observer not supported: {}", e);
                    None
                }
            }
        } else {
            debug!("Host has no performance observer, passive metrics disabled");
            None
        };

        Self {
            host,
            capabilities,
            start_time: 0.0,
            end_time: 0.0,
            metrics: PerformanceMetrics::default(),
            signals,
        }
    }

    /// Record the start of the interval
    ///
    /// Calling again restarts the interval.
    pub fn start_measuring(&mut self, label: &str) {
        self.start_time = self.host.now();
        if self.capabilities.marks {
            self.host.mark(&format!("{}-start", label));
        }
        trace!("Started '{}' at {:.3}ms", label, self.start_time);
    }

    /// Record the end of the interval and return its duration in ms
    ///
    /// The duration is also stored as `render_time`. With mark support the
    /// `<label>-end` mark is recorded. With measure support as well, a
    /// measure named `label` follows; its entry reaches `total_time`
    /// through the observer, not through this return value.
    pub fn end_measuring(&mut self, label: &str) -> f64 {
        self.end_time = self.host.now();
        if self.capabilities.marks {
            let end_mark = format!("{}-end", label);
            self.host.mark(&end_mark);
            if self.capabilities.measures {
                self.host.measure(label, &format!("{}-start", label), &end_mark);
            }
        }

        self.metrics.render_time = self.end_time - self.start_time;
        debug!("'{}' took {:.3}ms", label, self.metrics.render_time);
        self.metrics.render_time
    }

    /// Current heap usage in MB, or 0 when the host cannot sample it
    pub async fn get_memory_usage(&self) -> f64 {
        if !self.capabilities.heap_usage {
            return 0.0;
        }
        self.host.heap_used_bytes() as f64 / BYTES_PER_MB
    }

    /// Time a forced style recalculation and store it as `style_recalc_time`
    ///
    /// Without a document the probe is skipped, the stored value is left as
    /// it was, and 0 is returned.
    pub async fn measure_style_recalculation(&mut self) -> f64 {
        if !self.capabilities.document {
            debug!("No document available, skipping style recalculation probe");
            return 0.0;
        }

        let start = self.host.now();
        self.host.force_layout();
        let end = self.host.now();

        self.metrics.style_recalc_time = end - start;
        self.metrics.style_recalc_time
    }

    /// Populate memory and style-recalc fields and snapshot the record
    ///
    /// Signal-fed fields reflect whatever the host delivered up to now.
    #[instrument(skip(self))]
    pub async fn get_all_metrics(&mut self) -> PerformanceMetrics {
        self.drain_signals();
        self.metrics.memory_usage = self.get_memory_usage().await;
        self.measure_style_recalculation().await;
        self.metrics
    }

    /// Snapshot the record after folding in pending signals
    pub fn metrics(&mut self) -> PerformanceMetrics {
        self.drain_signals();
        self.metrics
    }

    /// Zero every field
    ///
    /// Entries already delivered belong to the previous window and are
    /// discarded. The subscription stays open.
    pub fn reset(&mut self) {
        self.drain_signals();
        self.metrics = PerformanceMetrics::default();
    }

    /// Release the observer subscription
    ///
    /// Safe to call more than once and on a collector that never
    /// subscribed.
    pub fn disconnect(&mut self) {
        if self.signals.take().is_some() {
            debug!("Performance observer disconnected");
        }
    }

    /// Whether the observer subscription is live
    pub fn is_observing(&self) -> bool {
        self.signals.is_some()
    }

    fn drain_signals(&mut self) {
        let Some(receiver) = self.signals.as_mut() else {
            return;
        };

        loop {
            match receiver.try_recv() {
                Ok(entry) => apply_entry(&mut self.metrics, &entry),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("Host closed the performance observer");
                    self.signals = None;
                    break;
                }
            }
        }
    }
}
