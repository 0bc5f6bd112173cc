//! Repeated measurement and comparison of named tests
//!
//! [`BatchRunner`] runs a unit of work a fixed number of times, measuring
//! each run with a fresh [`TimingCollector`], and keeps the raw records
//! under the test name so two tests can be compared afterwards.
//!
//! # Iteration lifecycle
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ new collector → start → await work → end → get_all_metrics  │
//! │      → push record → disconnect → settle delay → next run   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Iterations never overlap, and collectors share no state, so signals
//! from one run cannot leak into the next.
//!
//! # Example
//!
//! ```
//! use perf_tracker::batch::BatchRunner;
//! use perf_tracker::host::SimulatedHost;
//! use std::rc::Rc;
//!
//! # async fn example() {
//! let host = Rc::new(SimulatedHost::new());
//! let mut runner = BatchRunner::new(host.clone());
//!
//! let work_host = host.clone();
//! runner
//!     .run_test(
//!         "bem",
//!         || {
//!             work_host.advance(10.0);
//!             async {}
//!         },
//!         3,
//!     )
//!     .await;
//! let work_host = host.clone();
//! runner
//!     .run_test(
//!         "tailwind",
//!         || {
//!             work_host.advance(20.0);
//!             async {}
//!         },
//!         3,
//!     )
//!     .await;
//!
//! let comparison = runner.compare_results("bem", "tailwind").unwrap();
//! assert_eq!(comparison.improvements.render_time, 50.0);
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;
use tracing::{debug, info, instrument, warn};

use crate::config::{BatchConfig, ZeroBaseline};
use crate::host::PerformanceHost;
use crate::metrics::{MetricField, PerformanceMetrics, TimingCollector};
use crate::stats::{mean_record, BatchSummary};

/// Percentage difference per metric field
///
/// Positive values mean the first test had the smaller value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDeltas {
    #[serde(deserialize_with = "non_finite::deserialize")]
    pub render_time: f64,
    #[serde(deserialize_with = "non_finite::deserialize")]
    pub paint_time: f64,
    #[serde(deserialize_with = "non_finite::deserialize")]
    pub layout_time: f64,
    #[serde(deserialize_with = "non_finite::deserialize")]
    pub memory_usage: f64,
    #[serde(deserialize_with = "non_finite::deserialize")]
    pub style_recalc_time: f64,
    #[serde(deserialize_with = "non_finite::deserialize")]
    pub total_time: f64,
}

impl MetricDeltas {
    /// `(b - a) / b * 100` per field
    pub fn between(a: &PerformanceMetrics, b: &PerformanceMetrics, zero: ZeroBaseline) -> Self {
        let delta = |field: MetricField| percent_change(field.get(a), field.get(b), zero);

        Self {
            render_time: delta(MetricField::RenderTime),
            paint_time: delta(MetricField::PaintTime),
            layout_time: delta(MetricField::LayoutTime),
            memory_usage: delta(MetricField::MemoryUsage),
            style_recalc_time: delta(MetricField::StyleRecalcTime),
            total_time: delta(MetricField::TotalTime),
        }
    }

    pub fn get(&self, field: MetricField) -> f64 {
        match field {
            MetricField::RenderTime => self.render_time,
            MetricField::PaintTime => self.paint_time,
            MetricField::LayoutTime => self.layout_time,
            MetricField::MemoryUsage => self.memory_usage,
            MetricField::StyleRecalcTime => self.style_recalc_time,
            MetricField::TotalTime => self.total_time,
        }
    }
}

/// JSON writes NaN and infinities as `null`; read `null` back as NaN
mod non_finite {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

fn percent_change(a: f64, b: f64, zero: ZeroBaseline) -> f64 {
    match zero {
        ZeroBaseline::Sentinel(value) if b == 0.0 => value,
        _ => (b - a) / b * 100.0,
    }
}

/// Averaged metrics of two tests and their percentage deltas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub test1: String,
    pub test2: String,
    pub metrics1: PerformanceMetrics,
    pub metrics2: PerformanceMetrics,
    pub improvements: MetricDeltas,
}

/// Runs named tests repeatedly and keeps their raw records
pub struct BatchRunner {
    host: Rc<dyn PerformanceHost>,
    config: BatchConfig,
    results: HashMap<String, Vec<PerformanceMetrics>>,
}

impl BatchRunner {
    /// Create a runner with default settings (5 iterations, 100ms settle delay)
    pub fn new(host: Rc<dyn PerformanceHost>) -> Self {
        Self::with_config(host, BatchConfig::default())
    }

    /// Create a runner with custom settings
    pub fn with_config(host: Rc<dyn PerformanceHost>, config: BatchConfig) -> Self {
        Self {
            host,
            config,
            results: HashMap::new(),
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Measure `work` `iterations` times and return the field-wise mean
    ///
    /// The raw records replace anything previously stored under
    /// `test_name`. `iterations` must be at least 1; with 0 nothing is
    /// stored and every field of the returned mean is NaN.
    #[instrument(skip(self, work), fields(test = %test_name))]
    pub async fn run_test<F, Fut>(
        &mut self,
        test_name: &str,
        mut work: F,
        iterations: u32,
    ) -> PerformanceMetrics
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        if iterations == 0 {
            warn!("run_test called with 0 iterations, mean is undefined");
            return mean_record(&[]);
        }

        info!("Running '{}' for {} iterations", test_name, iterations);
        let mut records = Vec::with_capacity(iterations as usize);

        for iteration in 0..iterations {
            let mut collector = TimingCollector::new(self.host.clone());
            collector.start_measuring(test_name);

            work().await;

            collector.end_measuring(test_name);
            let metrics = collector.get_all_metrics().await;
            debug!(
                "Iteration {}: render {:.3}ms, total {:.3}ms",
                iteration + 1,
                metrics.render_time,
                metrics.total_time
            );
            records.push(metrics);
            collector.disconnect();

            self.host.settle(self.config.settle_delay).await;
        }

        let mean = mean_record(&records);
        self.results.insert(test_name.to_string(), records);

        info!(
            "'{}' mean render time {:.3}ms over {} iterations",
            test_name, mean.render_time, iterations
        );
        mean
    }

    /// Measure `work` with the configured iteration count
    pub async fn run_default<F, Fut>(&mut self, test_name: &str, work: F) -> PerformanceMetrics
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let iterations = self.config.iterations;
        self.run_test(test_name, work, iterations).await
    }

    /// Raw per-iteration records by test name
    pub fn get_results(&self) -> &HashMap<String, Vec<PerformanceMetrics>> {
        &self.results
    }

    /// Compare the averaged metrics of two stored tests
    ///
    /// Returns `None` when either test has no stored results.
    pub fn compare_results(&self, test1: &str, test2: &str) -> Option<ComparisonResult> {
        let (Some(results1), Some(results2)) = (self.results.get(test1), self.results.get(test2))
        else {
            debug!("No comparison available for '{}' vs '{}'", test1, test2);
            return None;
        };

        let metrics1 = mean_record(results1);
        let metrics2 = mean_record(results2);

        Some(ComparisonResult {
            test1: test1.to_string(),
            test2: test2.to_string(),
            improvements: MetricDeltas::between(&metrics1, &metrics2, self.config.zero_baseline),
            metrics1,
            metrics2,
        })
    }

    /// Spread statistics for a stored test
    pub fn summarize(&self, test_name: &str) -> Option<BatchSummary> {
        let records = self.results.get(test_name)?;
        BatchSummary::from_records(test_name, records)
    }

    /// Stored test names in sorted order
    pub fn test_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.results.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SimulatedHost;
    use std::time::Duration;

    fn record(render: f64, paint: f64) -> PerformanceMetrics {
        PerformanceMetrics {
            render_time: render,
            paint_time: paint,
            ..Default::default()
        }
    }

    fn runner_with(results: &[(&str, Vec<PerformanceMetrics>)]) -> BatchRunner {
        let mut runner = BatchRunner::new(Rc::new(SimulatedHost::new()));
        for (name, records) in results {
            runner.results.insert(name.to_string(), records.clone());
        }
        runner
    }

    #[test]
    fn test_percentage_delta_formula() {
        let runner = runner_with(&[
            ("a", vec![record(10.0, 40.0)]),
            ("b", vec![record(20.0, 50.0)]),
        ]);

        let comparison = runner.compare_results("a", "b").unwrap();
        assert_eq!(comparison.improvements.render_time, 50.0);
        assert_eq!(comparison.improvements.paint_time, 20.0);
        assert_eq!(comparison.metrics1.render_time, 10.0);
        assert_eq!(comparison.metrics2.render_time, 20.0);
    }

    #[test]
    fn test_delta_negative_when_first_is_slower() {
        let runner = runner_with(&[
            ("slow", vec![record(30.0, 1.0)]),
            ("fast", vec![record(20.0, 1.0)]),
        ]);

        let comparison = runner.compare_results("slow", "fast").unwrap();
        assert_eq!(comparison.improvements.render_time, -50.0);
        assert_eq!(comparison.improvements.paint_time, 0.0);
    }

    #[test]
    fn test_zero_baseline_propagates_by_default() {
        let runner = runner_with(&[
            ("a", vec![record(10.0, 0.0)]),
            ("b", vec![record(20.0, 0.0)]),
        ]);

        let comparison = runner.compare_results("a", "b").unwrap();
        // 0/0 for paint and every untouched field
        assert!(comparison.improvements.paint_time.is_nan());
        assert!(comparison.improvements.total_time.is_nan());

        let runner = runner_with(&[
            ("a", vec![record(10.0, 5.0)]),
            ("b", vec![record(20.0, 0.0)]),
        ]);
        let comparison = runner.compare_results("a", "b").unwrap();
        assert_eq!(comparison.improvements.paint_time, f64::NEG_INFINITY);
    }

    #[test]
    fn test_zero_baseline_sentinel() {
        let deltas = MetricDeltas::between(
            &record(10.0, 5.0),
            &record(20.0, 0.0),
            ZeroBaseline::Sentinel(0.0),
        );

        assert_eq!(deltas.render_time, 50.0);
        assert_eq!(deltas.paint_time, 0.0);
        assert_eq!(deltas.memory_usage, 0.0);
    }

    #[test]
    fn test_compare_unknown_name_is_none() {
        let runner = runner_with(&[("a", vec![record(1.0, 1.0)])]);

        assert!(runner.compare_results("a", "missing").is_none());
        assert!(runner.compare_results("missing", "a").is_none());
    }

    #[tokio::test]
    async fn test_run_test_stores_each_iteration() {
        let host = Rc::new(SimulatedHost::new());
        let mut runner = BatchRunner::new(host.clone());

        let work_host = host.clone();
        let mut cost = 0.0;
        let mean = runner
            .run_test(
                "css",
                || {
                    cost += 2.0;
                    work_host.advance(cost);
                    async {}
                },
                4,
            )
            .await;

        // 2, 4, 6, 8
        assert_eq!(runner.get_results()["css"].len(), 4);
        assert_eq!(mean.render_time, 5.0);
        assert_eq!(mean.total_time, 5.0);
    }

    #[tokio::test]
    async fn test_settle_delay_between_iterations() {
        let host = Rc::new(SimulatedHost::new());
        let config = BatchConfig {
            settle_delay: Duration::from_millis(100),
            ..Default::default()
        };
        let mut runner = BatchRunner::with_config(host.clone(), config);

        runner.run_test("idle", || async {}, 3).await;
        assert_eq!(host.now(), 300.0);
    }

    #[tokio::test]
    async fn test_zero_iterations_returns_nan() {
        let mut runner = BatchRunner::new(Rc::new(SimulatedHost::new()));
        let mean = runner.run_test("nothing", || async {}, 0).await;

        assert!(mean.render_time.is_nan());
        assert!(runner.get_results().get("nothing").is_none());
    }

    #[tokio::test]
    async fn test_run_default_uses_configured_iterations() {
        let config = BatchConfig {
            iterations: 7,
            settle_delay: Duration::ZERO,
            ..Default::default()
        };
        let mut runner = BatchRunner::with_config(Rc::new(SimulatedHost::new()), config);

        runner.run_default("bem", || async {}).await;
        assert_eq!(runner.get_results()["bem"].len(), 7);
    }

    #[test]
    fn test_summarize_and_names() {
        let runner = runner_with(&[
            ("tailwind", vec![record(4.0, 0.0), record(6.0, 0.0)]),
            ("bem", vec![record(1.0, 0.0)]),
        ]);

        let summary = runner.summarize("tailwind").unwrap();
        assert_eq!(summary.field(MetricField::RenderTime).unwrap().mean, 5.0);
        assert!(runner.summarize("missing").is_none());
        assert_eq!(runner.test_names(), vec!["bem", "tailwind"]);
    }

    #[test]
    fn test_comparison_serialization() {
        let runner = runner_with(&[
            ("a", vec![record(10.0, 40.0)]),
            ("b", vec![record(20.0, 50.0)]),
        ]);
        let comparison = runner.compare_results("a", "b").unwrap();

        let json = serde_json::to_string(&comparison).unwrap();
        assert!(json.contains("\"test1\":\"a\""));
        assert!(json.contains("\"improvements\""));
        assert!(json.contains("\"renderTime\":50.0"));
    }
}
