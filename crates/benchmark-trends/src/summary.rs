//! Summary rows and the machine-readable summary document

use crate::history::{RunHistory, RunTimelineEntry};
use crate::ranking::apply_ranking;
use crate::record::MeasurementRecord;
use crate::series::group_by_series;
use crate::trend::compute_trend;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Aggregation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Number of most recent samples in the rolling statistics window
    pub rolling_window: usize,
    /// Uncertainty floor in percent
    pub min_uncertainty_percent: f64,
    /// Uncertainty cap in percent
    pub max_uncertainty_percent: f64,
    /// Tolerance added to the combined band when testing co-best membership
    pub co_best_tolerance: f64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            rolling_window: 8,
            min_uncertainty_percent: 2.0,
            max_uncertainty_percent: 20.0,
            co_best_tolerance: 1e-9,
        }
    }
}

/// One historical sample carried inside a summary row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    /// Run identifier
    pub run_id: String,
    /// Run timestamp, ISO-8601 UTC
    pub run_timestamp: String,
    /// Observed score
    pub score: f64,
    /// Reported score error, if any
    pub score_error: Option<f64>,
}

/// One derived view of a `(version, benchmark)` history series, including
/// the cross-version ranking fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    /// Version label
    pub version: String,
    /// Benchmark name
    pub benchmark: String,
    /// Id of the latest run in the series
    pub latest_run: String,
    /// Timestamp of the latest run in the series
    pub latest_timestamp: String,
    /// Latest score
    pub latest_score: f64,
    /// Latest score error, if reported
    pub latest_score_error: Option<f64>,
    /// Score unit
    pub score_unit: String,
    /// Latest score relative to the previous run, in percent
    pub delta_vs_previous_percent: Option<f64>,
    /// Rolling-window mean
    #[serde(rename = "meanLast8")]
    pub rolling_mean: Option<f64>,
    /// Rolling-window sample standard deviation
    #[serde(rename = "stdevLast8")]
    pub rolling_stdev: Option<f64>,
    /// Rolling-window coefficient of variation, in percent
    #[serde(rename = "cvLast8Percent")]
    pub rolling_cv_percent: Option<f64>,
    /// Total sample count of the series
    pub samples: usize,
    /// Thread count of the latest run, if reported
    pub threads: Option<i64>,
    /// Fork count of the latest run, if reported
    pub forks: Option<i64>,
    /// Measurement iteration count of the latest run, if reported
    pub measurement_iterations: Option<i64>,
    /// Measurement time label of the latest run, if reported
    pub measurement_time: Option<String>,
    /// Full per-sample history of the series, chronological
    pub history: Vec<HistoryPoint>,
    /// True only for the single nominal winner of the benchmark group
    pub strict_best: bool,
    /// True for every version statistically indistinguishable from the winner
    pub co_best: bool,
    /// This row's own uncertainty band, in percent, clamped to the configured
    /// floor and cap
    pub uncertainty_percent: f64,
    /// Combined uncertainty band of this row and the best row, in percent
    pub best_band_percent: f64,
    /// Gap to the best score, in percent of the best score
    pub delta_from_best_percent: f64,
}

/// The machine-readable summary document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDocument {
    /// Generation timestamp, ISO-8601 UTC
    pub generated_at_utc: String,
    /// Total number of measurement records covered
    pub total_records: usize,
    /// Number of distinct benchmarks covered
    pub total_benchmarks: usize,
    /// Id of the chronologically latest run in the full history
    pub latest_run_id: Option<String>,
    /// Full chronological run index
    pub run_index: Vec<RunTimelineEntry>,
    /// Summary rows, ordered by (benchmark, version)
    pub rows: Vec<SummaryRow>,
}

/// Derive summary rows from a flat record set: group into series, compute
/// trend statistics per series, then rank versions per benchmark group.
pub fn summarize(records: &[MeasurementRecord], config: &SummaryConfig) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = group_by_series(records)
        .into_iter()
        .map(|(key, series)| {
            let scores: Vec<f64> = series.iter().map(|record| record.score).collect();
            let trend = compute_trend(&scores, config.rolling_window);
            // Sorting guarantees the series is non-empty with "latest" last.
            let latest = series[series.len() - 1];

            SummaryRow {
                version: key.version,
                benchmark: key.benchmark,
                latest_run: latest.run_id.clone(),
                latest_timestamp: latest.run_timestamp.clone(),
                latest_score: latest.score,
                latest_score_error: latest.score_error,
                score_unit: latest.score_unit.clone(),
                delta_vs_previous_percent: trend.delta_vs_previous_percent,
                rolling_mean: trend.mean,
                rolling_stdev: trend.stdev,
                rolling_cv_percent: trend.cv_percent,
                samples: trend.samples,
                threads: latest.threads,
                forks: latest.forks,
                measurement_iterations: latest.measurement_iterations,
                measurement_time: latest.measurement_time.clone(),
                history: series
                    .iter()
                    .map(|record| HistoryPoint {
                        run_id: record.run_id.clone(),
                        run_timestamp: record.run_timestamp.clone(),
                        score: record.score,
                        score_error: record.score_error,
                    })
                    .collect(),
                strict_best: false,
                co_best: false,
                uncertainty_percent: config.min_uncertainty_percent,
                best_band_percent: config.min_uncertainty_percent,
                delta_from_best_percent: 0.0,
            }
        })
        .collect();

    apply_ranking(&mut rows, config);
    rows
}

/// Build the summary document for the full history.
pub fn build_summary(history: &RunHistory, config: &SummaryConfig) -> SummaryDocument {
    build_summary_from(&history.records, history, config)
}

/// Build a summary document over an arbitrary record subset (snapshot
/// replay), while the run index and latest-run id still describe the full
/// history.
pub fn build_summary_from(
    records: &[MeasurementRecord],
    history: &RunHistory,
    config: &SummaryConfig,
) -> SummaryDocument {
    let rows = summarize(records, config);
    let benchmarks: BTreeSet<&str> = rows.iter().map(|row| row.benchmark.as_str()).collect();

    SummaryDocument {
        generated_at_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        total_records: records.len(),
        total_benchmarks: benchmarks.len(),
        latest_run_id: history.latest_run_id(),
        run_index: history.run_timeline(),
        rows,
    }
}
