//! Metrics records and the timing collector that fills them
//!
//! - [`PerformanceMetrics`]: the six numeric fields recorded per measurement
//! - [`TimingCollector`]: measures one labeled interval and folds in the
//!   paint, layout-shift and measure entries the host delivers meanwhile
//!
//! # Example
//!
//! ```
//! use perf_tracker::host::SimulatedHost;
//! use perf_tracker::metrics::TimingCollector;
//! use std::rc::Rc;
//!
//! let host = Rc::new(SimulatedHost::new());
//! let mut collector = TimingCollector::new(host.clone());
//!
//! collector.start_measuring("list");
//! host.advance(8.0);
//! let render_time = collector.end_measuring("list");
//!
//! assert_eq!(render_time, 8.0);
//! collector.disconnect();
//! ```

pub mod collector;
pub mod signals;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use collector::TimingCollector;

/// Bytes per megabyte for heap samples
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Metrics captured for one measurement session
///
/// All fields start at zero. Fields fed by host signals stay at zero when
/// the host never delivers them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// Duration of the measured interval (ms)
    pub render_time: f64,
    /// Start offset of the first-contentful-paint entry (ms since time origin)
    pub paint_time: f64,
    /// Sum of layout-shift entry durations (ms)
    pub layout_time: f64,
    /// Heap usage sample (MB)
    pub memory_usage: f64,
    /// Duration of the style-recalculation probe (ms)
    pub style_recalc_time: f64,
    /// Sum of measure entry durations (ms)
    pub total_time: f64,
}

impl PerformanceMetrics {
    /// Build a record by evaluating `f` for every field
    pub fn from_fn(mut f: impl FnMut(MetricField) -> f64) -> Self {
        let mut record = Self::default();
        for field in MetricField::ALL {
            field.set(&mut record, f(field));
        }
        record
    }
}

/// Names one field of [`PerformanceMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricField {
    RenderTime,
    PaintTime,
    LayoutTime,
    MemoryUsage,
    StyleRecalcTime,
    TotalTime,
}

impl MetricField {
    /// Every field in declaration order
    pub const ALL: [MetricField; 6] = [
        MetricField::RenderTime,
        MetricField::PaintTime,
        MetricField::LayoutTime,
        MetricField::MemoryUsage,
        MetricField::StyleRecalcTime,
        MetricField::TotalTime,
    ];

    pub fn get(&self, record: &PerformanceMetrics) -> f64 {
        match self {
            MetricField::RenderTime => record.render_time,
            MetricField::PaintTime => record.paint_time,
            MetricField::LayoutTime => record.layout_time,
            MetricField::MemoryUsage => record.memory_usage,
            MetricField::StyleRecalcTime => record.style_recalc_time,
            MetricField::TotalTime => record.total_time,
        }
    }

    pub fn set(&self, record: &mut PerformanceMetrics, value: f64) {
        match self {
            MetricField::RenderTime => record.render_time = value,
            MetricField::PaintTime => record.paint_time = value,
            MetricField::LayoutTime => record.layout_time = value,
            MetricField::MemoryUsage => record.memory_usage = value,
            MetricField::StyleRecalcTime => record.style_recalc_time = value,
            MetricField::TotalTime => record.total_time = value,
        }
    }

    /// Human-readable label for reports
    pub fn label(&self) -> &'static str {
        match self {
            MetricField::RenderTime => "Render",
            MetricField::PaintTime => "Paint",
            MetricField::LayoutTime => "Layout",
            MetricField::MemoryUsage => "Memory",
            MetricField::StyleRecalcTime => "Style Recalc",
            MetricField::TotalTime => "Total",
        }
    }

    /// Unit suffix for reports
    pub fn unit(&self) -> &'static str {
        match self {
            MetricField::MemoryUsage => "MB",
            _ => "ms",
        }
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
