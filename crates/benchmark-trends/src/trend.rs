//! Rolling-window trend statistics for one chronological series

use serde::{Deserialize, Serialize};

/// Trend statistics over one chronologically sorted series of scores.
///
/// Every statistic that cannot be computed is `None`, never zero or NaN;
/// downstream consumers must distinguish "no data" from "zero".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendStats {
    /// Latest score relative to the previous one, in percent. Absent when
    /// there is no previous sample or its score is exactly zero.
    pub delta_vs_previous_percent: Option<f64>,
    /// Arithmetic mean of the rolling window
    pub mean: Option<f64>,
    /// Sample standard deviation of the rolling window; absent below two
    /// window samples
    pub stdev: Option<f64>,
    /// Coefficient of variation of the window in percent; absent when the
    /// stdev is absent or the mean is zero
    pub cv_percent: Option<f64>,
    /// Total number of samples in the series
    pub samples: usize,
}

/// Compute trend statistics from scores in chronological order, using a
/// rolling window of the last `window` samples.
pub fn compute_trend(scores: &[f64], window: usize) -> TrendStats {
    let delta_vs_previous_percent = match scores {
        [.., previous, latest] if *previous != 0.0 => finite((latest / previous - 1.0) * 100.0),
        _ => None,
    };

    let start = scores.len().saturating_sub(window);
    let recent = &scores[start..];

    let mean = if recent.is_empty() {
        None
    } else {
        finite(recent.iter().sum::<f64>() / recent.len() as f64)
    };

    let stdev = if recent.len() >= 2 {
        mean.and_then(|mean| {
            let variance = recent.iter().map(|score| (score - mean).powi(2)).sum::<f64>()
                / (recent.len() - 1) as f64;
            finite(variance.sqrt())
        })
    } else {
        None
    };

    let cv_percent = match (mean, stdev) {
        (Some(mean), Some(stdev)) if mean != 0.0 => finite(stdev / mean * 100.0),
        _ => None,
    };

    TrendStats {
        delta_vs_previous_percent,
        mean,
        stdev,
        cv_percent,
        samples: scores.len(),
    }
}

/// Demote NaN and infinity to "absent".
fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
