//! Point-in-time snapshot replay over the run history
//!
//! Snapshots carry no incremental state: each one is a full recompute of the
//! summary and chart data over the prefix of run history up to a given run.
//! The cost is O(records) per snapshot and O(runs) snapshots per generation,
//! which is fine for low-frequency batch reporting.

use crate::align::{build_chart_data, BenchmarkChart};
use crate::error::{BenchmarkTrendsError, BenchmarkTrendsResult};
use crate::history::RunHistory;
use crate::record::MeasurementRecord;
use crate::summary::{build_summary_from, SummaryConfig, SummaryDocument};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

/// One "as of run R" view; `run_id` of `None` is the cumulative view over
/// the full history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotView {
    /// Target run id, or `None` for the cumulative view
    pub run_id: Option<String>,
    /// Summary document recomputed over the restricted record set
    pub summary: SummaryDocument,
    /// Aligned chart data recomputed over the restricted record set
    pub charts: BTreeMap<String, BenchmarkChart>,
}

/// Restrict records to the prefix of run history ending at `run_id`.
///
/// Membership is positional in the canonical chronological run order, not a
/// timestamp comparison. A run id absent from the order yields an empty set.
pub fn records_up_to(
    records: &[MeasurementRecord],
    run_order: &[String],
    run_id: &str,
) -> Vec<MeasurementRecord> {
    let Some(position) = run_order.iter().position(|id| id == run_id) else {
        return Vec::new();
    };
    let included: HashSet<&str> = run_order[..=position]
        .iter()
        .map(String::as_str)
        .collect();
    records
        .iter()
        .filter(|record| included.contains(record.run_id.as_str()))
        .cloned()
        .collect()
}

/// Build the cumulative view plus one snapshot view per historical run,
/// each recomputed from scratch over its restricted record set.
pub fn build_snapshots(history: &RunHistory, config: &SummaryConfig) -> Vec<SnapshotView> {
    let run_order = history.run_order();
    let mut views = Vec::with_capacity(run_order.len() + 1);

    views.push(SnapshotView {
        run_id: None,
        summary: build_summary_from(&history.records, history, config),
        charts: build_chart_data(&history.records),
    });

    for run_id in &run_order {
        let restricted = records_up_to(&history.records, &run_order, run_id);
        views.push(SnapshotView {
            run_id: Some(run_id.clone()),
            summary: build_summary_from(&restricted, history, config),
            charts: build_chart_data(&restricted),
        });
    }

    views
}

/// Write the summary documents for every snapshot: `summary.json` for the
/// cumulative view and `runs/<run-id>.json` per historical run.
pub fn write_reports(
    history: &RunHistory,
    config: &SummaryConfig,
    output_dir: &Path,
) -> BenchmarkTrendsResult<()> {
    let runs_dir = output_dir.join("runs");
    fs::create_dir_all(&runs_dir).map_err(|e| BenchmarkTrendsError::Io {
        path: runs_dir.clone(),
        source: e,
    })?;

    let views = build_snapshots(history, config);
    for view in &views {
        let path = match &view.run_id {
            None => output_dir.join("summary.json"),
            Some(run_id) => runs_dir.join(format!("{run_id}.json")),
        };
        let mut payload = serde_json::to_string_pretty(&view.summary)?;
        payload.push('\n');
        fs::write(&path, payload).map_err(|e| BenchmarkTrendsError::Io {
            path: path.clone(),
            source: e,
        })?;
    }

    info!(
        snapshots = views.len(),
        output = %output_dir.display(),
        "wrote summary reports"
    );
    Ok(())
}
