//! Statistics over per-iteration metrics records
//!
//! # Examples
//!
//! ```
//! use perf_tracker::metrics::PerformanceMetrics;
//! use perf_tracker::stats::mean_record;
//!
//! let runs = vec![
//!     PerformanceMetrics { render_time: 10.0, ..Default::default() },
//!     PerformanceMetrics { render_time: 20.0, ..Default::default() },
//! ];
//! assert_eq!(mean_record(&runs).render_time, 15.0);
//! ```

mod summary;

pub use summary::{BatchSummary, FieldSummary};

use crate::metrics::{MetricField, PerformanceMetrics};

/// Field-wise arithmetic mean
///
/// An empty slice divides by zero and yields NaN in every field.
pub fn mean_record(records: &[PerformanceMetrics]) -> PerformanceMetrics {
    let count = records.len() as f64;
    PerformanceMetrics::from_fn(|field| field_values(records, field).sum::<f64>() / count)
}

/// Values of one field across records
pub fn field_values(
    records: &[PerformanceMetrics],
    field: MetricField,
) -> impl Iterator<Item = f64> + '_ {
    records.iter().map(move |record| field.get(record))
}
