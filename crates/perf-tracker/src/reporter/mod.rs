//! Batch result reporting
//!
//! This module gathers a [`BatchRunner`]'s stored tests and comparisons
//! into a [`BatchReport`] and formats it for humans or machines.
//!
//! # Output Formats
//!
//! - **JSON**: Machine-readable format, field names match the page code
//! - **Console**: Human-readable tables
//!
//! # Example
//!
//! ```no_run
//! use perf_tracker::batch::BatchRunner;
//! use perf_tracker::reporter::{BatchReport, OutputFormat, Reporter};
//!
//! # fn example(runner: &BatchRunner) -> anyhow::Result<()> {
//! let mut report = BatchReport::from_runner("Styling techniques", runner);
//! if let Some(comparison) = runner.compare_results("plain-css", "runtime-injection") {
//!     report = report.with_comparison(comparison);
//! }
//!
//! Reporter::new(OutputFormat::Console).report(&report)?;
//! Reporter::new(OutputFormat::JsonPretty).write_to_file(&report, "results.json")?;
//! # Ok(())
//! # }
//! ```

mod console;
mod json;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::batch::{BatchRunner, ComparisonResult};
use crate::metrics::PerformanceMetrics;
use crate::stats::{mean_record, BatchSummary};

pub use console::ConsoleReporter;
pub use json::JsonReporter;

/// Averages and spread for one stored test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    pub test_name: String,
    pub iterations: usize,
    pub mean: PerformanceMetrics,
    pub summary: Option<BatchSummary>,
}

/// Everything one batch session produced
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub suite_name: String,
    /// RFC 3339 timestamp of report creation
    pub started_at: String,
    pub tests: Vec<TestReport>,
    pub comparisons: Vec<ComparisonResult>,
}

impl BatchReport {
    pub fn new(suite_name: &str) -> Self {
        Self {
            suite_name: suite_name.to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
            tests: Vec::new(),
            comparisons: Vec::new(),
        }
    }

    /// Report every test stored in the runner, sorted by name
    pub fn from_runner(suite_name: &str, runner: &BatchRunner) -> Self {
        let results = runner.get_results();
        let tests = runner
            .test_names()
            .into_iter()
            .map(|name| {
                let records = &results[name];
                TestReport {
                    test_name: name.to_string(),
                    iterations: records.len(),
                    mean: mean_record(records),
                    summary: runner.summarize(name),
                }
            })
            .collect();

        Self {
            tests,
            ..Self::new(suite_name)
        }
    }

    pub fn with_comparison(mut self, comparison: ComparisonResult) -> Self {
        self.comparisons.push(comparison);
        self
    }
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JSON format for machine parsing
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Console tables
    #[default]
    Console,
}

/// Reporter for batch results
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Report to stdout
    pub fn report(&self, report: &BatchReport) -> Result<()> {
        let output = self.format_report(report)?;
        print!("{}", output);
        io::stdout().flush()?;
        Ok(())
    }

    /// Write the report to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, report: &BatchReport, path: P) -> Result<()> {
        let path = path.as_ref();
        let output = self.format_report(report)?;
        fs::write(path, output)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Format the report as a string
    pub fn format_report(&self, report: &BatchReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => JsonReporter::format(report, false),
            OutputFormat::JsonPretty => JsonReporter::format(report, true),
            OutputFormat::Console => ConsoleReporter::format(report),
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}
