//! Render performance tracker for styling techniques
//!
//! This crate measures how long a page takes to render, paint and lay out
//! a piece of UI, and compares those numbers across repeated runs of
//! different styling techniques (plain CSS, BEM, utility classes, runtime
//! style injection and so on).
//!
//! # Features
//!
//! - **Timing collection**: Start/end marks, observed paint and layout-shift
//!   signals, heap usage and forced style recalculation per measurement
//! - **Batch runs**: Repeat a unit of work, keep every record, average them
//! - **Comparisons**: Per-metric percentage deltas between two tests
//! - **Host abstraction**: A simulated page for tests, an in-process host
//!   for native runs and a browser host (feature `browser`, wasm32 only)
//! - **Multiple Output Formats**: JSON and Console reports
//!
//! # Example
//!
//! ```
//! use perf_tracker::{BatchRunner, SimulatedHost};
//! use perf_tracker::reporter::{BatchReport, OutputFormat, Reporter};
//! use std::rc::Rc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let host = Rc::new(SimulatedHost::new());
//! let mut runner = BatchRunner::new(host.clone());
//!
//! let work_host = host.clone();
//! runner
//!     .run_test(
//!         "plain-css",
//!         || {
//!             work_host.advance(8.0);
//!             async {}
//!         },
//!         5,
//!     )
//!     .await;
//! let work_host = host.clone();
//! runner
//!     .run_test(
//!         "runtime-injection",
//!         || {
//!             work_host.advance(12.0);
//!             async {}
//!         },
//!         5,
//!     )
//!     .await;
//!
//! let mut report = BatchReport::from_runner("Styling techniques", &runner);
//! if let Some(comparison) = runner.compare_results("plain-css", "runtime-injection") {
//!     report = report.with_comparison(comparison);
//! }
//! Reporter::new(OutputFormat::Console).report(&report)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! Batch runs are configured using TOML files:
//!
//! ```toml
//! [batch]
//! iterations = 5
//! settle_delay_ms = 100
//! zero_baseline = "propagate"
//!
//! [[techniques]]
//! name = "plain-css"
//! items = 1000
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod host;
pub mod metrics;
pub mod probe;
pub mod reporter;
pub mod stats;

// Re-export main types for convenience
pub use batch::{BatchRunner, ComparisonResult, MetricDeltas};
pub use config::Config;
pub use error::TrackerError;
pub use host::{PerformanceHost, SimulatedHost, SystemHost};
pub use metrics::{PerformanceMetrics, TimingCollector};
pub use probe::{ComponentProbe, MountTimer};
pub use reporter::{OutputFormat, Reporter};
