//! Spread statistics per metric field

use serde::{Deserialize, Serialize};

use super::field_values;
use crate::metrics::{MetricField, PerformanceMetrics};

/// Summary of one field across iterations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation, 0 for a single sample
    pub std_dev: f64,
    pub count: usize,
}

impl FieldSummary {
    /// Summarize samples, `None` when empty
    ///
    /// # Examples
    ///
    /// ```
    /// use perf_tracker::stats::FieldSummary;
    ///
    /// let summary = FieldSummary::from_samples(&[2.0, 4.0, 6.0]).unwrap();
    /// assert_eq!(summary.mean, 4.0);
    /// assert_eq!(summary.std_dev, 2.0);
    /// ```
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let count = samples.len();
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = samples.iter().sum::<f64>() / count as f64;

        let std_dev = if count > 1 {
            let squared: f64 = samples.iter().map(|&x| (x - mean).powi(2)).sum();
            (squared / (count - 1) as f64).sqrt()
        } else {
            0.0
        };

        Some(Self {
            min,
            max,
            mean,
            std_dev,
            count,
        })
    }

    /// Standard deviation relative to the mean, infinite when the mean is 0
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            f64::INFINITY
        } else {
            self.std_dev / self.mean
        }
    }
}

/// Per-field summaries for one named batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub test_name: String,
    pub iterations: usize,
    pub fields: Vec<(MetricField, FieldSummary)>,
}

impl BatchSummary {
    /// Summarize stored records, `None` when there are none
    pub fn from_records(test_name: &str, records: &[PerformanceMetrics]) -> Option<Self> {
        let fields = MetricField::ALL
            .into_iter()
            .map(|field| {
                let samples: Vec<f64> = field_values(records, field).collect();
                FieldSummary::from_samples(&samples).map(|summary| (field, summary))
            })
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            test_name: test_name.to_string(),
            iterations: records.len(),
            fields,
        })
    }

    pub fn field(&self, field: MetricField) -> Option<&FieldSummary> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, summary)| summary)
    }
}
