//! Native host backed by the process monotonic clock
//!
//! User Timing marks and measures are kept in-process, so measures recorded
//! by a collector still feed `total_time` through the observer channel.
//! There is no heap sampler and no document, so `memory_usage` and
//! `style_recalc_time` stay at zero.

use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::RefCell;
use std::time::{Duration, Instant};

use super::timeline::Timeline;
use super::{Capabilities, EntryReceiver, EntryType, PerformanceEntry, PerformanceHost};
use crate::error::TrackerError;

/// Frame pacing used when no compositor drives animation frames
const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Host measuring real elapsed time since construction
pub struct SystemHost {
    origin: Instant,
    timeline: RefCell<Timeline>,
}

impl SystemHost {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            timeline: RefCell::new(Timeline::default()),
        }
    }

    /// Deliver an externally produced entry to subscribers
    pub fn emit(&self, entry: PerformanceEntry) {
        self.timeline.borrow_mut().dispatch(entry);
    }
}

impl Default for SystemHost {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceHost for SystemHost {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            marks: true,
            measures: true,
            observer: true,
            heap_usage: false,
            document: false,
        }
    }

    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn mark(&self, name: &str) {
        let at = self.now();
        self.timeline.borrow_mut().mark(name, at);
    }

    fn measure(&self, name: &str, start_mark: &str, end_mark: &str) {
        self.timeline.borrow_mut().measure(name, start_mark, end_mark);
    }

    fn observe(&self, entry_types: &[EntryType]) -> Result<EntryReceiver, TrackerError> {
        Ok(self.timeline.borrow_mut().subscribe(entry_types))
    }

    fn heap_used_bytes(&self) -> u64 {
        0
    }

    fn force_layout(&self) {}

    fn next_frame(&self) -> LocalBoxFuture<'static, f64> {
        let origin = self.origin;
        async move {
            tokio::time::sleep(FRAME_INTERVAL).await;
            origin.elapsed().as_secs_f64() * 1000.0
        }
        .boxed_local()
    }

    fn settle(&self, delay: Duration) -> LocalBoxFuture<'static, ()> {
        tokio::time::sleep(delay).boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic() {
        let host = SystemHost::new();
        let a = host.now();
        let b = host.now();
        assert!(b >= a);
        assert!(a >= 0.0);
    }

    #[tokio::test]
    async fn test_settle_waits_at_least_delay() {
        let host = SystemHost::new();
        let before = host.now();
        host.settle(Duration::from_millis(20)).await;
        assert!(host.now() - before >= 19.0);
    }

    #[test]
    fn test_measure_feeds_observer() {
        let host = SystemHost::new();
        let mut rx = host.observe(&[EntryType::Measure]).unwrap();

        host.mark("probe-start");
        host.mark("probe-end");
        host.measure("probe", "probe-start", "probe-end");

        let entry = rx.try_recv().unwrap();
        assert_eq!(entry.name, "probe");
        assert!(entry.duration.unwrap() >= 0.0);
    }
}
