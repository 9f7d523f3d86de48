//! Loading of the on-disk run-history store

use crate::error::{BenchmarkTrendsError, BenchmarkTrendsResult};
use crate::record::{parse_result_set, MeasurementRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Open "bag of fields" document (run metadata, runner/environment info)
pub type MetadataDocument = serde_json::Map<String, Value>;

/// One entry of the chronological run index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTimelineEntry {
    /// Run identifier
    pub run_id: String,
    /// Run timestamp, ISO-8601 UTC; falls back to the run id when absent
    pub run_timestamp_utc: String,
}

/// Everything loaded from a run-history root: the flat record set plus the
/// per-run metadata and runner documents.
#[derive(Debug, Clone, Default)]
pub struct RunHistory {
    /// All measurement records across all runs
    pub records: Vec<MeasurementRecord>,
    /// Run id to run metadata document
    pub run_metadata: BTreeMap<String, MetadataDocument>,
    /// Run id to runner/environment document, passed through opaquely
    pub run_runner: BTreeMap<String, MetadataDocument>,
}

impl RunHistory {
    /// Chronological run index, sorted by `(run timestamp, run id)`.
    ///
    /// Directory discovery order is lexical and not guaranteed chronological;
    /// every order-sensitive consumer goes through this index.
    pub fn run_timeline(&self) -> Vec<RunTimelineEntry> {
        let mut entries: Vec<RunTimelineEntry> = self
            .run_metadata
            .iter()
            .map(|(run_id, metadata)| RunTimelineEntry {
                run_id: run_id.clone(),
                run_timestamp_utc: metadata
                    .get("runTimestampUtc")
                    .and_then(Value::as_str)
                    .unwrap_or(run_id)
                    .to_string(),
            })
            .collect();
        entries.sort_by(|a, b| {
            (a.run_timestamp_utc.as_str(), a.run_id.as_str())
                .cmp(&(b.run_timestamp_utc.as_str(), b.run_id.as_str()))
        });
        entries
    }

    /// Run ids in canonical chronological order.
    pub fn run_order(&self) -> Vec<String> {
        self.run_timeline()
            .into_iter()
            .map(|entry| entry.run_id)
            .collect()
    }

    /// Id of the chronologically latest run, if any runs exist.
    pub fn latest_run_id(&self) -> Option<String> {
        self.run_timeline().pop().map(|entry| entry.run_id)
    }
}

/// Load the full run history from a root directory.
///
/// The root contains one subdirectory per run, each optionally holding a
/// `run-metadata.json`, a `runner-info.json`, and a `results/` directory with
/// one result file per version (file stem = version label). A missing root
/// yields an empty history. Missing or unparseable optional documents default
/// to an empty mapping; a run without a results directory contributes no
/// records but still contributes metadata.
pub fn load_history(root: &Path) -> BenchmarkTrendsResult<RunHistory> {
    let mut history = RunHistory::default();
    if !root.exists() {
        return Ok(history);
    }

    for run_dir in sorted_subdirectories(root)? {
        let Some(run_id) = run_dir.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let run_id = run_id.to_string();

        let metadata = read_document(&run_dir.join("run-metadata.json"));
        let runner = read_document(&run_dir.join("runner-info.json"));
        let run_timestamp = metadata
            .get("runTimestampUtc")
            .and_then(Value::as_str)
            .unwrap_or(&run_id)
            .to_string();
        history.run_metadata.insert(run_id.clone(), metadata);
        history.run_runner.insert(run_id.clone(), runner);

        let results_dir = run_dir.join("results");
        if !results_dir.is_dir() {
            continue;
        }

        for result_file in sorted_result_files(&results_dir)? {
            let Some(version) = result_file.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match read_json(&result_file) {
                Some(payload) => {
                    history
                        .records
                        .extend(parse_result_set(&payload, &run_id, &run_timestamp, version));
                }
                None => debug!(path = %result_file.display(), "skipping unreadable result file"),
            }
        }
    }

    info!(
        runs = history.run_metadata.len(),
        records = history.records.len(),
        "loaded benchmark history"
    );
    Ok(history)
}

fn sorted_subdirectories(root: &Path) -> BenchmarkTrendsResult<Vec<PathBuf>> {
    let entries = fs::read_dir(root).map_err(|e| BenchmarkTrendsError::Io {
        path: root.to_path_buf(),
        source: e,
    })?;
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn sorted_result_files(results_dir: &Path) -> BenchmarkTrendsResult<Vec<PathBuf>> {
    let entries = fs::read_dir(results_dir).map_err(|e| BenchmarkTrendsError::Io {
        path: results_dir.to_path_buf(),
        source: e,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

/// Read an optional JSON object document; anything missing or malformed
/// degrades to an empty mapping.
fn read_document(path: &Path) -> MetadataDocument {
    match read_json(path) {
        Some(Value::Object(map)) => map,
        Some(_) => {
            debug!(path = %path.display(), "document is not a JSON object, treating as empty");
            MetadataDocument::new()
        }
        None => MetadataDocument::new(),
    }
}

fn read_json(path: &Path) -> Option<Value> {
    let text = fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}
