//! Measurement records and tolerant normalization of raw result payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// One observed benchmark score from one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Identifier of the run that produced this score
    pub run_id: String,
    /// Run timestamp, ISO-8601 UTC
    pub run_timestamp: String,
    /// Version label the benchmark was executed against
    pub version: String,
    /// Fully qualified benchmark name
    pub benchmark: String,
    /// Primary score
    pub score: f64,
    /// Reported score error, if any
    pub score_error: Option<f64>,
    /// Unit of the primary score
    pub score_unit: String,
    /// Thread count used by the run, if reported
    pub threads: Option<i64>,
    /// Fork count used by the run, if reported
    pub forks: Option<i64>,
    /// Measurement iteration count, if reported
    pub measurement_iterations: Option<i64>,
    /// Measurement time label, if reported
    pub measurement_time: Option<String>,
}

/// Parse one decoded result payload into measurement records.
///
/// A payload that is not an array yields an empty list. Elements whose
/// primary score is missing or not convertible to a float are skipped
/// individually; the rest of the batch is unaffected.
pub fn parse_result_set(
    payload: &Value,
    run_id: &str,
    run_timestamp: &str,
    version: &str,
) -> Vec<MeasurementRecord> {
    let Some(items) = payload.as_array() else {
        return Vec::new();
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match parse_result_entry(item, run_id, run_timestamp, version) {
            Some(record) => records.push(record),
            None => debug!(run_id, version, "skipping malformed benchmark entry"),
        }
    }
    records
}

fn parse_result_entry(
    item: &Value,
    run_id: &str,
    run_timestamp: &str,
    version: &str,
) -> Option<MeasurementRecord> {
    let metric = item.get("primaryMetric")?;
    let score = number_value(metric.get("score")?)?;

    // "NaN", null, and absent all mean "no error reported"; any other
    // unparseable value makes the whole entry malformed.
    let score_error = match metric.get("scoreError") {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) if raw == "NaN" => None,
        Some(value) => Some(number_value(value)?),
    };

    Some(MeasurementRecord {
        run_id: run_id.to_string(),
        run_timestamp: run_timestamp.to_string(),
        version: version.to_string(),
        benchmark: item
            .get("benchmark")
            .and_then(Value::as_str)
            .unwrap_or("<unknown>")
            .to_string(),
        score,
        score_error,
        score_unit: metric
            .get("scoreUnit")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        threads: item.get("threads").and_then(Value::as_i64),
        forks: item.get("forks").and_then(Value::as_i64),
        measurement_iterations: item.get("measurementIterations").and_then(Value::as_i64),
        measurement_time: item
            .get("measurementTime")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Convert a JSON number or numeric string to a float.
fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(payload: Value) -> Vec<MeasurementRecord> {
        parse_result_set(&payload, "run-1", "2024-01-01T00:00:00Z", "1.0.0")
    }

    #[test]
    fn test_non_array_payload_yields_empty() {
        assert!(parse(json!({"benchmark": "x"})).is_empty());
        assert!(parse(json!("not a result set")).is_empty());
        assert!(parse(json!(null)).is_empty());
    }

    #[test]
    fn test_valid_entry_is_normalized() {
        let records = parse(json!([{
            "benchmark": "io.test.Bench.hello",
            "primaryMetric": {
                "score": 1234.5,
                "scoreError": 12.5,
                "scoreUnit": "ops/ms"
            },
            "threads": 16,
            "forks": 1,
            "measurementIterations": 5,
            "measurementTime": "2 s"
        }]));

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.run_id, "run-1");
        assert_eq!(record.version, "1.0.0");
        assert_eq!(record.benchmark, "io.test.Bench.hello");
        assert_eq!(record.score, 1234.5);
        assert_eq!(record.score_error, Some(12.5));
        assert_eq!(record.score_unit, "ops/ms");
        assert_eq!(record.threads, Some(16));
        assert_eq!(record.forks, Some(1));
        assert_eq!(record.measurement_iterations, Some(5));
        assert_eq!(record.measurement_time.as_deref(), Some("2 s"));
    }

    #[test]
    fn test_numeric_string_score_is_accepted() {
        let records = parse(json!([{
            "benchmark": "b",
            "primaryMetric": {"score": "42.25", "scoreUnit": "ops/ms"}
        }]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].score, 42.25);
    }

    #[test]
    fn test_malformed_score_skips_only_that_entry() {
        let records = parse(json!([
            {"benchmark": "a", "primaryMetric": {"score": 10.0}},
            {"benchmark": "b", "primaryMetric": {"score": "not a number"}},
            {"benchmark": "c", "primaryMetric": {"score": 30.0}},
        ]));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].benchmark, "a");
        assert_eq!(records[1].benchmark, "c");
    }

    #[test]
    fn test_missing_primary_metric_skips_entry() {
        let records = parse(json!([
            {"benchmark": "a"},
            {"benchmark": "b", "primaryMetric": {}},
            {"benchmark": "c", "primaryMetric": {"score": 1.0}},
        ]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].benchmark, "c");
    }

    #[test]
    fn test_nan_and_null_score_error_mean_absent() {
        let records = parse(json!([
            {"benchmark": "a", "primaryMetric": {"score": 1.0, "scoreError": "NaN"}},
            {"benchmark": "b", "primaryMetric": {"score": 2.0, "scoreError": null}},
            {"benchmark": "c", "primaryMetric": {"score": 3.0}},
        ]));
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|record| record.score_error.is_none()));
    }

    #[test]
    fn test_missing_descriptive_fields_default_to_absent() {
        let records = parse(json!([{"primaryMetric": {"score": 5.0}}]));
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.benchmark, "<unknown>");
        assert_eq!(record.score_unit, "");
        assert!(record.threads.is_none());
        assert!(record.forks.is_none());
        assert!(record.measurement_iterations.is_none());
        assert!(record.measurement_time.is_none());
    }
}
