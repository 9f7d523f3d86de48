//! Uncertainty-band ranking of versions within each benchmark group
//!
//! A raw "highest score wins" comparison is misleading when measurement noise
//! exceeds the observed gap. Each row gets an uncertainty band derived from
//! its rolling CV and reported score error; a version counts as co-best when
//! its gap to the winner is within the combined band of both measurements.

use crate::summary::{SummaryConfig, SummaryRow};
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

/// Rank versions within each benchmark group, filling the per-row ranking
/// fields: uncertainty, strict-best, combined band, delta-from-best, co-best.
///
/// Exactly one row per group ends up strict-best (ties broken by the first
/// row holding the maximum score); the co-best set always includes it.
pub fn apply_ranking(rows: &mut [SummaryRow], config: &SummaryConfig) {
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, row) in rows.iter().enumerate() {
        groups.entry(row.benchmark.clone()).or_default().push(index);
    }

    for group in groups.values() {
        let mut best = group[0];
        for &index in &group[1..] {
            if OrderedFloat(rows[index].latest_score) > OrderedFloat(rows[best].latest_score) {
                best = index;
            }
        }

        let best_score = rows[best].latest_score;
        let best_uncertainty = uncertainty_percent(&rows[best], config);

        for &index in group {
            let row_uncertainty = uncertainty_percent(&rows[index], config);
            let combined_band = (best_uncertainty.powi(2) + row_uncertainty.powi(2))
                .sqrt()
                .clamp(
                    config.min_uncertainty_percent,
                    config.max_uncertainty_percent,
                );
            let delta_from_best = if best_score != 0.0 {
                (best_score - rows[index].latest_score) / best_score * 100.0
            } else {
                0.0
            };

            let row = &mut rows[index];
            row.strict_best = index == best;
            row.uncertainty_percent = row_uncertainty;
            row.best_band_percent = combined_band;
            row.delta_from_best_percent = delta_from_best;
            row.co_best = delta_from_best <= combined_band + config.co_best_tolerance;
        }
    }
}

/// A row's own uncertainty band in percent: the largest of the configured
/// floor, |CV%|, and the relative score error, counting only finite
/// candidates, capped at the configured maximum.
fn uncertainty_percent(row: &SummaryRow, config: &SummaryConfig) -> f64 {
    let mut uncertainty = config.min_uncertainty_percent;

    if let Some(cv) = row.rolling_cv_percent {
        if cv.is_finite() {
            uncertainty = uncertainty.max(cv.abs());
        }
    }
    if let Some(error) = row.latest_score_error {
        if row.latest_score != 0.0 {
            let relative = (error / row.latest_score * 100.0).abs();
            if relative.is_finite() {
                uncertainty = uncertainty.max(relative);
            }
        }
    }

    uncertainty.min(config.max_uncertainty_percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(version: &str, benchmark: &str, score: f64) -> SummaryRow {
        SummaryRow {
            version: version.to_string(),
            benchmark: benchmark.to_string(),
            latest_run: "r1".to_string(),
            latest_timestamp: "2024-01-01T00:00:00Z".to_string(),
            latest_score: score,
            latest_score_error: None,
            score_unit: "ops/ms".to_string(),
            delta_vs_previous_percent: None,
            rolling_mean: Some(score),
            rolling_stdev: None,
            rolling_cv_percent: None,
            samples: 1,
            threads: None,
            forks: None,
            measurement_iterations: None,
            measurement_time: None,
            history: Vec::new(),
            strict_best: false,
            co_best: false,
            uncertainty_percent: 2.0,
            best_band_percent: 2.0,
            delta_from_best_percent: 0.0,
        }
    }

    #[test]
    fn test_single_strict_best_per_group() {
        let mut rows = vec![
            row("1.0", "bench.a", 100.0),
            row("2.0", "bench.a", 150.0),
            row("3.0", "bench.a", 120.0),
        ];
        apply_ranking(&mut rows, &SummaryConfig::default());

        let best: Vec<&str> = rows
            .iter()
            .filter(|r| r.strict_best)
            .map(|r| r.version.as_str())
            .collect();
        assert_eq!(best, vec!["2.0"]);
        assert!(rows[1].co_best, "strict best is always co-best");
        assert_eq!(rows[1].delta_from_best_percent, 0.0);
    }

    #[test]
    fn test_score_tie_goes_to_first_row() {
        let mut rows = vec![
            row("1.0", "bench.a", 100.0),
            row("2.0", "bench.a", 100.0),
        ];
        apply_ranking(&mut rows, &SummaryConfig::default());
        assert!(rows[0].strict_best);
        assert!(!rows[1].strict_best);
        // The tied row is trivially co-best.
        assert!(rows[1].co_best);
    }

    #[test]
    fn test_uncertainty_is_clamped_to_floor_and_cap() {
        let config = SummaryConfig::default();

        let mut quiet = row("1.0", "bench.a", 100.0);
        quiet.rolling_cv_percent = Some(0.01);
        assert_relative_eq!(uncertainty_percent(&quiet, &config), 2.0);

        let mut noisy = row("1.0", "bench.a", 100.0);
        noisy.rolling_cv_percent = Some(95.0);
        assert_relative_eq!(uncertainty_percent(&noisy, &config), 20.0);

        let mut errored = row("1.0", "bench.a", 100.0);
        errored.latest_score_error = Some(12.0);
        assert_relative_eq!(uncertainty_percent(&errored, &config), 12.0);
    }

    #[test]
    fn test_non_finite_candidates_are_ignored() {
        let config = SummaryConfig::default();
        let mut zero_score = row("1.0", "bench.a", 0.0);
        zero_score.latest_score_error = Some(5.0);
        zero_score.rolling_cv_percent = Some(f64::INFINITY);
        assert_relative_eq!(uncertainty_percent(&zero_score, &config), 2.0);
    }

    #[test]
    fn test_combined_band_and_co_best_boundary() {
        // Worked example: a=[100,110] b=[95,150]; CV(a)≈6.73%, CV(b) clamps
        // to 20%. Combined band ≈ 21.1% but the cap brings it back to 20%,
        // and a's 26.7% gap is outside either way.
        let mut row_a = row("a", "bench.x", 110.0);
        row_a.rolling_cv_percent = Some(50.0_f64.sqrt() / 105.0 * 100.0);
        let mut row_b = row("b", "bench.x", 150.0);
        row_b.rolling_cv_percent = Some(38.890872965260113 / 122.5 * 100.0);

        let mut rows = vec![row_a, row_b];
        apply_ranking(&mut rows, &SummaryConfig::default());

        assert!(rows[1].strict_best);
        assert_relative_eq!(rows[1].uncertainty_percent, 20.0, epsilon = 1e-9);
        assert_relative_eq!(
            rows[0].delta_from_best_percent,
            (150.0 - 110.0) / 150.0 * 100.0,
            epsilon = 1e-9
        );
        // sqrt(20² + 6.73²) ≈ 21.1, clamped to 20.
        assert_relative_eq!(rows[0].best_band_percent, 20.0, epsilon = 1e-9);
        assert!(!rows[0].co_best);
    }

    #[test]
    fn test_co_best_within_band() {
        let mut rows = vec![
            row("fast", "bench.a", 100.0),
            row("close", "bench.a", 98.0),
            row("slow", "bench.a", 70.0),
        ];
        apply_ranking(&mut rows, &SummaryConfig::default());

        // Floor uncertainty 2% on both sides: combined band = sqrt(8) ≈ 2.83%.
        assert!(rows[0].strict_best && rows[0].co_best);
        assert!(rows[1].co_best, "2% gap sits inside the combined band");
        assert!(!rows[1].strict_best);
        assert!(!rows[2].co_best);
        assert_relative_eq!(
            rows[1].best_band_percent,
            8.0_f64.sqrt(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_co_best_never_exceeds_band_plus_tolerance() {
        let config = SummaryConfig::default();
        let mut rows = vec![
            row("1.0", "bench.a", 100.0),
            row("2.0", "bench.a", 97.0),
            row("3.0", "bench.a", 90.0),
            row("4.0", "bench.a", 40.0),
        ];
        apply_ranking(&mut rows, &config);
        for r in &rows {
            if r.co_best {
                assert!(
                    r.delta_from_best_percent <= r.best_band_percent + config.co_best_tolerance
                );
            }
        }
    }

    #[test]
    fn test_zero_best_score_yields_zero_delta() {
        let mut rows = vec![
            row("1.0", "bench.a", 0.0),
            row("2.0", "bench.a", -5.0),
        ];
        apply_ranking(&mut rows, &SummaryConfig::default());
        assert!(rows[0].strict_best);
        assert_eq!(rows[1].delta_from_best_percent, 0.0);
    }

    #[test]
    fn test_groups_are_ranked_independently() {
        let mut rows = vec![
            row("1.0", "bench.a", 10.0),
            row("2.0", "bench.a", 20.0),
            row("1.0", "bench.b", 30.0),
            row("2.0", "bench.b", 5.0),
        ];
        apply_ranking(&mut rows, &SummaryConfig::default());
        assert!(!rows[0].strict_best && rows[1].strict_best);
        assert!(rows[2].strict_best && !rows[3].strict_best);
    }
}
