//! Error types for benchmark history aggregation

use std::path::PathBuf;
use thiserror::Error;

/// Benchmark trend aggregation error types
#[derive(Debug, Error)]
pub enum BenchmarkTrendsError {
    /// Filesystem operation failed
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path the operation was acting on
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

/// Benchmark trend aggregation result type
pub type BenchmarkTrendsResult<T> = Result<T, BenchmarkTrendsError>;
