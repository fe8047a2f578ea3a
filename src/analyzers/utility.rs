use chrono::NaiveDate;

use crate::error::{AnalyticsError, Result};

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / total`, or 0.0 when there is nothing to divide by.
pub fn ratio(part: f64, total: f64) -> f64 {
    if total <= 0.0 { 0.0 } else { part / total }
}

/// Validates a reporting period and returns how many days the day loop may
/// visit: `min(span + 1, max_days)`.
pub fn day_budget(start: NaiveDate, end: NaiveDate, max_days: i64) -> Result<usize> {
    if start > end {
        return Err(AnalyticsError::InvalidRange {
            start,
            end,
            reason: "start is after end".to_string(),
        });
    }

    let span = (end - start).num_days();
    if span > max_days {
        return Err(AnalyticsError::InvalidRange {
            start,
            end,
            reason: format!("span of {span} days exceeds the {max_days}-day cap"),
        });
    }

    Ok((span + 1).min(max_days) as usize)
}
