//! Benchmark history aggregation and uncertainty-band ranking
//!
//! This crate turns a flat store of per-run benchmark measurements into
//! comparative time-series summaries:
//! - Tolerant normalization of raw per-version result files
//! - Loading of a run-history store with per-run metadata documents
//! - Rolling-window trend statistics per (version, benchmark) series
//! - Best / near-best classification across versions using a
//!   measurement-uncertainty band
//! - Sparse-to-dense alignment of version series onto a shared run axis
//! - Stateless "as of run N" snapshot replay
//!
//! Everything is a pure transformation over immutable inputs: one generation
//! pass reads the history, recomputes every derived view from scratch, and
//! emits machine-readable summary documents. Malformed or missing inputs
//! degrade to empty or absent values at the smallest possible scope.

#![warn(missing_docs)]

pub mod align;
pub mod error;
pub mod history;
pub mod ranking;
pub mod record;
pub mod series;
pub mod snapshot;
pub mod summary;
pub mod trend;


pub use align::{build_chart_data, BenchmarkChart, ChartAxisPoint, ChartSeries};
pub use error::{BenchmarkTrendsError, BenchmarkTrendsResult};
pub use history::{load_history, MetadataDocument, RunHistory, RunTimelineEntry};
pub use ranking::apply_ranking;
pub use record::{parse_result_set, MeasurementRecord};
pub use series::{group_by_series, sort_key, SeriesKey};
pub use snapshot::{build_snapshots, records_up_to, write_reports, SnapshotView};
pub use summary::{
    build_summary, build_summary_from, summarize, HistoryPoint, SummaryConfig, SummaryDocument,
    SummaryRow,
};
pub use trend::{compute_trend, TrendStats};
