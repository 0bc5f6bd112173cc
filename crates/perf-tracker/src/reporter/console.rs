//! Console reporter for batch results
//!
//! Provides human-readable output with ASCII tables.

use anyhow::Result;
use std::fmt::Write;

use super::{BatchReport, TestReport};
use crate::batch::ComparisonResult;
use crate::metrics::MetricField;

/// Console format reporter
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// Format a batch report for console output
    pub fn format(report: &BatchReport) -> Result<String> {
        let mut output = String::new();

        writeln!(output)?;
        writeln!(output, "╔══════════════════════════════════════════════════════════════╗")?;
        writeln!(output, "║                  PERFORMANCE RESULTS                         ║")?;
        writeln!(output, "╚══════════════════════════════════════════════════════════════╝")?;
        writeln!(output)?;

        writeln!(output, "Suite:     {}", report.suite_name)?;
        writeln!(output, "Started:   {}", report.started_at)?;
        writeln!(output, "Tests:     {}", report.tests.len())?;
        writeln!(output)?;

        for test in &report.tests {
            Self::format_test(&mut output, test)?;
        }

        for comparison in &report.comparisons {
            Self::format_comparison(&mut output, comparison)?;
        }

        Ok(output)
    }

    fn format_test(output: &mut String, test: &TestReport) -> Result<()> {
        writeln!(output, "────────────────────────────────────────────────────────────────")?;
        writeln!(output, "Test: {} ({} iterations)", test.test_name, test.iterations)?;
        writeln!(output, "────────────────────────────────────────────────────────────────")?;
        writeln!(output)?;

        writeln!(output, "  ┌───────────────────┬──────────┬──────────┬──────────┬──────────┐")?;
        writeln!(output, "  │ Metric            │   Mean   │   Min    │   Max    │  StdDev  │")?;
        writeln!(output, "  ├───────────────────┼──────────┼──────────┼──────────┼──────────┤")?;

        for field in MetricField::ALL {
            let mean = field.get(&test.mean);
            let spread = test.summary.as_ref().and_then(|s| s.field(field));
            let cell = |value: Option<f64>| {
                value
                    .map(format_value)
                    .unwrap_or_else(|| "-".to_string())
            };

            writeln!(
                output,
                "  │ {:<17} │ {:>8} │ {:>8} │ {:>8} │ {:>8} │",
                format!("{} ({})", field.label(), field.unit()),
                format_value(mean),
                cell(spread.map(|s| s.min)),
                cell(spread.map(|s| s.max)),
                cell(spread.map(|s| s.std_dev)),
            )?;
        }

        writeln!(output, "  └───────────────────┴──────────┴──────────┴──────────┴──────────┘")?;
        writeln!(output)?;
        Ok(())
    }

    fn format_comparison(output: &mut String, comparison: &ComparisonResult) -> Result<()> {
        writeln!(output, "────────────────────────────────────────────────────────────────")?;
        writeln!(output, "Comparison: {} vs {}", comparison.test1, comparison.test2)?;
        writeln!(output, "────────────────────────────────────────────────────────────────")?;
        writeln!(output)?;

        writeln!(
            output,
            "  {:<18} {:>12} {:>12} {:>10}",
            "Metric", comparison.test1, comparison.test2, "Δ%"
        )?;
        for field in MetricField::ALL {
            writeln!(
                output,
                "  {:<18} {:>12} {:>12} {:>10}",
                format!("{} ({})", field.label(), field.unit()),
                format_value(field.get(&comparison.metrics1)),
                format_value(field.get(&comparison.metrics2)),
                format_delta(comparison.improvements.get(field)),
            )?;
        }

        writeln!(output)?;
        Ok(())
    }
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "n/a".to_string()
    } else if v.abs() < 1.0 {
        format!("{:.3}", v)
    } else {
        format!("{:.2}", v)
    }
}

fn format_delta(v: f64) -> String {
    if v.is_nan() {
        "n/a".to_string()
    } else if v.is_infinite() {
        if v > 0.0 {
            "+∞".to_string()
        } else {
            "-∞".to_string()
        }
    } else {
        format!("{:+.1}%", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::test_support::sample_report;

    #[test]
    fn test_console_format_contains_suite_name() {
        let output = ConsoleReporter::format(&sample_report()).unwrap();
        assert!(output.contains("Styling techniques"));
    }

    #[test]
    fn test_console_format_contains_metrics_table() {
        let output = ConsoleReporter::format(&sample_report()).unwrap();

        assert!(output.contains("Render (ms)"));
        assert!(output.contains("Memory (MB)"));
        assert!(output.contains("StdDev"));
        assert!(output.contains("Test: plain-css (2 iterations)"));
    }

    #[test]
    fn test_console_format_shows_comparison() {
        let output = ConsoleReporter::format(&sample_report()).unwrap();

        assert!(output.contains("Comparison: plain-css vs runtime-injection"));
        // (18 - 12) / 18 * 100
        assert!(output.contains("+33.3%"));
    }

    #[test]
    fn test_format_delta_edge_cases() {
        assert_eq!(format_delta(f64::NAN), "n/a");
        assert_eq!(format_delta(f64::INFINITY), "+∞");
        assert_eq!(format_delta(f64::NEG_INFINITY), "-∞");
        assert_eq!(format_delta(-12.345), "-12.3%");
    }

    #[test]
    fn test_format_value_precision() {
        assert_eq!(format_value(0.4), "0.400");
        assert_eq!(format_value(12.0), "12.00");
    }
}
