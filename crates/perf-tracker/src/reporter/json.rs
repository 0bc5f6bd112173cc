//! JSON reporter for batch results
//!
//! Non-finite numbers (a delta against a zero baseline) become `null`,
//! and read back as NaN.

use super::BatchReport;
use anyhow::Result;

/// JSON format reporter
pub struct JsonReporter;

impl JsonReporter {
    /// Format a report as JSON, optionally pretty-printed
    pub fn format(report: &BatchReport, pretty: bool) -> Result<String> {
        let output = if pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(output)
    }
}
