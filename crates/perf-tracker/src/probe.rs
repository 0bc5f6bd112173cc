//! Component-level measurement helpers
//!
//! Page code measures a component from the moment it starts rendering
//! until two animation frames later, which is when the browser has painted
//! the result. These helpers package that pattern.

use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::{debug, instrument};

use crate::host::PerformanceHost;
use crate::metrics::{PerformanceMetrics, TimingCollector};

/// Frames to wait before the component is considered painted
pub const PAINT_FRAMES: usize = 2;

/// Full metrics for one component render
pub struct ComponentProbe;

impl ComponentProbe {
    /// Measure from now until two frames have been painted
    ///
    /// Creates a collector, waits [`PAINT_FRAMES`] animation frames, ends
    /// the interval, gathers all metrics and disconnects.
    #[instrument(skip(host))]
    pub async fn measure(host: Rc<dyn PerformanceHost>, component: &str) -> PerformanceMetrics {
        let mut collector = TimingCollector::new(host.clone());
        collector.start_measuring(component);

        wait_for_paint(&*host).await;

        collector.end_measuring(component);
        let metrics = collector.get_all_metrics().await;
        collector.disconnect();
        metrics
    }
}

async fn wait_for_paint(host: &dyn PerformanceHost) {
    for _ in 0..PAINT_FRAMES {
        let timestamp = host.next_frame().await;
        debug!("Animation frame at {:.3}ms", timestamp);
    }
}

/// Mount and render times of a component
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountTimings {
    /// From first render to mount (ms)
    pub mount_time: f64,
    /// From first render to two painted frames (ms)
    pub render_time: f64,
}

/// Lightweight timer started when a component first renders
pub struct MountTimer {
    host: Rc<dyn PerformanceHost>,
    started_at: f64,
    mount_time: Option<f64>,
}

impl MountTimer {
    pub fn start(host: Rc<dyn PerformanceHost>) -> Self {
        let started_at = host.now();
        Self {
            host,
            started_at,
            mount_time: None,
        }
    }

    /// Record the mount point and return the mount time in ms
    pub fn mounted(&mut self) -> f64 {
        let mount_time = self.host.now() - self.started_at;
        self.mount_time = Some(mount_time);
        mount_time
    }

    /// Wait for two painted frames and return the render time in ms
    pub async fn rendered(&self) -> f64 {
        wait_for_paint(&*self.host).await;
        self.host.now() - self.started_at
    }

    /// Mount (if not yet recorded) and render timings together
    pub async fn finish(mut self) -> MountTimings {
        let mount_time = match self.mount_time {
            Some(t) => t,
            None => self.mounted(),
        };
        let render_time = self.rendered().await;

        MountTimings {
            mount_time,
            render_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Capabilities, SimulatedHost};

    #[tokio::test]
    async fn test_probe_waits_two_frames() {
        let host = Rc::new(SimulatedHost::new().with_frame_interval(16.0));
        let metrics = ComponentProbe::measure(host.clone(), "card-grid").await;

        assert_eq!(metrics.render_time, 32.0);
        assert_eq!(metrics.total_time, 32.0);
        assert_eq!(host.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_probe_without_capabilities() {
        let host = Rc::new(
            SimulatedHost::with_capabilities(Capabilities::none()).with_frame_interval(10.0),
        );
        let metrics = ComponentProbe::measure(host, "list").await;

        assert_eq!(metrics.render_time, 20.0);
        assert_eq!(metrics.total_time, 0.0);
        assert_eq!(metrics.memory_usage, 0.0);
    }

    #[tokio::test]
    async fn test_mount_timer() {
        let host = Rc::new(SimulatedHost::new().with_frame_interval(16.0));
        let mut timer = MountTimer::start(host.clone());

        host.advance(3.0);
        assert_eq!(timer.mounted(), 3.0);

        host.advance(1.0);
        let timings = timer.finish().await;
        assert_eq!(timings.mount_time, 3.0);
        assert_eq!(timings.render_time, 36.0);
    }

    #[tokio::test]
    async fn test_mount_timer_finish_records_mount() {
        let host = Rc::new(SimulatedHost::new().with_frame_interval(5.0));
        let timer = MountTimer::start(host.clone());

        host.advance(2.0);
        let timings = timer.finish().await;
        assert_eq!(timings.mount_time, 2.0);
        assert_eq!(timings.render_time, 12.0);
    }
}
