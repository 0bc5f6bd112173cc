//! Folding passive host entries into a metrics record

use tracing::trace;

use super::PerformanceMetrics;
use crate::host::{EntryType, PerformanceEntry, FIRST_CONTENTFUL_PAINT};

/// Entry types a collector subscribes to
pub const OBSERVED_ENTRY_TYPES: [EntryType; 3] =
    [EntryType::Measure, EntryType::Paint, EntryType::LayoutShift];

/// Apply one entry to the record
///
/// - measure: duration added to `total_time`
/// - first-contentful-paint: start offset replaces `paint_time`
/// - layout-shift: duration (0 when absent) added to `layout_time`
///
/// Other entries are ignored.
pub fn apply_entry(metrics: &mut PerformanceMetrics, entry: &PerformanceEntry) {
    match entry.entry_type {
        EntryType::Measure => {
            metrics.total_time += entry.duration.unwrap_or(0.0);
        }
        EntryType::Paint if entry.name == FIRST_CONTENTFUL_PAINT => {
            metrics.paint_time = entry.start_time;
        }
        EntryType::LayoutShift => {
            metrics.layout_time += entry.duration.unwrap_or(0.0);
        }
        _ => {
            trace!("Ignoring {} entry '{}'", entry.entry_type.as_str(), entry.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measures_accumulate() {
        let mut metrics = PerformanceMetrics::default();
        apply_entry(&mut metrics, &PerformanceEntry::measure("a", 0.0, 4.0));
        apply_entry(&mut metrics, &PerformanceEntry::measure("b", 10.0, 6.5));

        assert_eq!(metrics.total_time, 10.5);
    }

    #[test]
    fn test_first_contentful_paint_last_wins() {
        let mut metrics = PerformanceMetrics::default();
        apply_entry(&mut metrics, &PerformanceEntry::paint(FIRST_CONTENTFUL_PAINT, 120.0));
        apply_entry(&mut metrics, &PerformanceEntry::paint("first-paint", 90.0));
        assert_eq!(metrics.paint_time, 120.0);

        apply_entry(&mut metrics, &PerformanceEntry::paint(FIRST_CONTENTFUL_PAINT, 140.0));
        assert_eq!(metrics.paint_time, 140.0);
    }

    #[test]
    fn test_layout_shift_without_duration_counts_zero() {
        let mut metrics = PerformanceMetrics::default();
        apply_entry(&mut metrics, &PerformanceEntry::layout_shift(5.0, Some(2.0)));
        apply_entry(&mut metrics, &PerformanceEntry::layout_shift(9.0, None));

        assert_eq!(metrics.layout_time, 2.0);
    }

    #[test]
    fn test_marks_are_ignored() {
        let mut metrics = PerformanceMetrics::default();
        let mark = PerformanceEntry {
            name: "list-start".to_string(),
            entry_type: EntryType::Mark,
            start_time: 3.0,
            duration: Some(0.0),
        };
        apply_entry(&mut metrics, &mark);

        assert_eq!(metrics, PerformanceMetrics::default());
    }
}
