//! Configuration parsing for batch measurements
//!
//! This module provides TOML-based configuration for the batch runner
//! (iteration count, settle delay, zero-baseline handling in comparisons)
//! and for the list of styling techniques the demo compares.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::TrackerError;

/// Main configuration structure loaded from TOML files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Batch runner settings
    #[serde(default)]
    pub batch: BatchConfig,
    /// Styling techniques to measure
    #[serde(default)]
    pub techniques: Vec<TechniqueConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML is malformed
    /// - A value is out of range (see [`Config::validate`])
    ///
    /// # Example
    ///
    /// ```no_run
    /// use perf_tracker::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = Config::from_file("perf.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use perf_tracker::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let toml = r#"
    ///     [batch]
    ///     iterations = 10
    ///
    ///     [[techniques]]
    ///     name = "bem"
    /// "#;
    /// let config = Config::from_str(toml)?;
    /// assert_eq!(config.batch.iterations, 10);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the batch runner does not accept
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.batch.iterations == 0 {
            return Err(TrackerError::InvalidConfig(
                "batch.iterations must be at least 1".to_string(),
            ));
        }
        if let Some(technique) = self.techniques.iter().find(|t| t.name.trim().is_empty()) {
            return Err(TrackerError::InvalidConfig(format!(
                "technique with {} items has an empty name",
                technique.items
            )));
        }
        Ok(())
    }
}

/// Batch runner parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Iterations per test when none is given (default: 5)
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Pause between iterations (default: 100ms)
    #[serde(
        rename = "settle_delay_ms",
        with = "duration_ms",
        default = "default_settle_delay"
    )]
    pub settle_delay: Duration,
    /// How comparisons report a field whose second mean is zero
    #[serde(default)]
    pub zero_baseline: ZeroBaseline,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            settle_delay: default_settle_delay(),
            zero_baseline: ZeroBaseline::default(),
        }
    }
}

fn default_iterations() -> u32 {
    5
}

fn default_settle_delay() -> Duration {
    Duration::from_millis(100)
}

/// Handling of a zero denominator in percentage deltas
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ZeroBaseline {
    /// Report the raw IEEE result (±infinity, or NaN for 0/0)
    #[default]
    Propagate,
    /// Report this value instead
    Sentinel(f64),
}

/// A styling technique and the size of its synthetic list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueConfig {
    /// Technique name used as the test name
    pub name: String,
    /// Number of list items rendered per iteration (default: 1000)
    #[serde(default = "default_items")]
    pub items: usize,
}

fn default_items() -> usize {
    1000
}

/// Serde module for serializing/deserializing Duration as milliseconds
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}
