//! Grouping of records into chronological per-version, per-benchmark series

use crate::record::MeasurementRecord;
use std::collections::BTreeMap;

/// Identity of one history series: a `(version, benchmark)` pair.
///
/// Ordered benchmark-first so that map iteration yields the canonical
/// `(benchmark, version)` row order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
    /// Benchmark name
    pub benchmark: String,
    /// Version label
    pub version: String,
}

/// The shared chronological sort key: `(run timestamp, run id)`.
///
/// Run ids tie-break colliding timestamps. Every order-sensitive operation
/// (sorting, "previous" lookups, snapshot prefixing, axis building) uses this
/// key rather than any container's natural order.
pub fn sort_key(record: &MeasurementRecord) -> (&str, &str) {
    (&record.run_timestamp, &record.run_id)
}

/// Partition records by `(version, benchmark)` with each series sorted
/// ascending by [`sort_key`]; the last element of a series is "latest".
pub fn group_by_series(
    records: &[MeasurementRecord],
) -> BTreeMap<SeriesKey, Vec<&MeasurementRecord>> {
    let mut grouped: BTreeMap<SeriesKey, Vec<&MeasurementRecord>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(SeriesKey {
                benchmark: record.benchmark.clone(),
                version: record.version.clone(),
            })
            .or_default()
            .push(record);
    }
    for series in grouped.values_mut() {
        series.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
    }
    grouped
}
