//! Alignment of sparse per-version series onto a shared run axis
//!
//! Each version may have been measured only on a subset of runs; the aligner
//! produces chart-ready arrays of equal length with explicit gaps where a
//! version has no measurement. Consumers must render gaps as breaks in a
//! trend line, never bridge or interpolate them.

use crate::record::MeasurementRecord;
use crate::series::sort_key;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Line colors cycled across versions of one benchmark.
const SERIES_PALETTE: [&str; 6] = [
    "#0f8b8d", "#c23b4f", "#2a63d4", "#ef8354", "#1f7a8c", "#4f5d75",
];

/// One position on the shared run axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartAxisPoint {
    /// Run identifier
    pub run_id: String,
    /// Compact axis label derived from the run timestamp
    pub label: String,
    /// Full human-readable timestamp label
    pub full_label: String,
}

/// One version's values aligned to the shared axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    /// Version label
    pub name: String,
    /// One value per axis position; `None` marks a gap, never zero
    pub data: Vec<Option<f64>>,
    /// Display color
    pub color: String,
}

/// Chart-ready alignment of all version series of one benchmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkChart {
    /// Benchmark name
    pub benchmark: String,
    /// Score unit, assumed uniform within a benchmark
    pub score_unit: String,
    /// Shared run axis, sorted by `(timestamp, run id)`
    pub runs: Vec<ChartAxisPoint>,
    /// Per-version aligned series, versions in sorted order
    pub series: Vec<ChartSeries>,
}

/// Build aligned chart data for every benchmark present in the record set.
pub fn build_chart_data(records: &[MeasurementRecord]) -> BTreeMap<String, BenchmarkChart> {
    let mut by_benchmark: BTreeMap<&str, Vec<&MeasurementRecord>> = BTreeMap::new();
    for record in records {
        by_benchmark
            .entry(record.benchmark.as_str())
            .or_default()
            .push(record);
    }

    by_benchmark
        .into_iter()
        .map(|(benchmark, mut values)| {
            values.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
            (benchmark.to_string(), align_benchmark(benchmark, &values))
        })
        .collect()
}

/// Align the (sorted) records of one benchmark onto a shared run axis.
fn align_benchmark(benchmark: &str, values: &[&MeasurementRecord]) -> BenchmarkChart {
    // Axis = distinct (timestamp, run id) pairs in chronological order.
    let axis: BTreeSet<(&str, &str)> = values.iter().map(|record| sort_key(record)).collect();
    let run_index: HashMap<&str, usize> = axis
        .iter()
        .enumerate()
        .map(|(index, (_, run_id))| (*run_id, index))
        .collect();

    let versions: BTreeSet<&str> = values.iter().map(|record| record.version.as_str()).collect();
    let score_unit = values
        .first()
        .map(|record| record.score_unit.clone())
        .unwrap_or_default();

    let series = versions
        .iter()
        .enumerate()
        .map(|(version_index, version)| {
            let mut data: Vec<Option<f64>> = vec![None; axis.len()];
            for record in values.iter().filter(|record| record.version == *version) {
                data[run_index[record.run_id.as_str()]] = Some(record.score);
            }
            ChartSeries {
                name: version.to_string(),
                data,
                color: SERIES_PALETTE[version_index % SERIES_PALETTE.len()].to_string(),
            }
        })
        .collect();

    BenchmarkChart {
        benchmark: benchmark.to_string(),
        score_unit,
        runs: axis
            .iter()
            .map(|(timestamp, run_id)| ChartAxisPoint {
                run_id: run_id.to_string(),
                label: compact_timestamp(timestamp),
                full_label: display_timestamp(timestamp),
            })
            .collect(),
        series,
    }
}

/// Compact `MM-DD HH:MM` slice of an ISO-8601 timestamp; unrecognized values
/// pass through unchanged.
fn compact_timestamp(value: &str) -> String {
    match value.get(5..16) {
        Some(slice) if value.contains('T') => slice.replace('T', " "),
        _ => value.to_string(),
    }
}

/// Full `YYYY-MM-DD HH:MM:SS UTC` label; naive timestamps are assumed UTC and
/// unparseable values pass through unchanged.
fn display_timestamp(value: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return parsed
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    }
    value.to_string()
}
