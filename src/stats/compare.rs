/// A/B comparison views over two finished benchmark reports
use serde::{Deserialize, Serialize};

use crate::harness::BenchmarkReport;
use crate::stats::aggregate::TimingSummary;
use crate::stats::histogram::{bin_pair, DualHistogram};
use crate::stats::series::{dual_time_series, DualTimeSeries};

/// The five statistics shown side by side in the overview.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Mean,
    Median,
    Min,
    Max,
    StdDev,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Mean => "Mean",
            Metric::Median => "Median",
            Metric::Min => "Min",
            Metric::Max => "Max",
            Metric::StdDev => "Std Dev",
        }
    }

    fn pick(&self, timing: &TimingSummary) -> f64 {
        match self {
            Metric::Mean => timing.mean_ms,
            Metric::Median => timing.median_ms,
            Metric::Min => timing.min_ms,
            Metric::Max => timing.max_ms,
            Metric::StdDev => timing.std_dev_ms,
        }
    }
}

const OVERVIEW_METRICS: [Metric; 5] = [
    Metric::Mean,
    Metric::Median,
    Metric::Min,
    Metric::Max,
    Metric::StdDev,
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverviewRow {
    pub metric: Metric,
    pub baseline_ms: f64,
    pub candidate_ms: f64,
}

/// Side-by-side rows for the five core statistics. No speedup ratio is
/// derived here; presentation may compute one from the raw pair.
pub fn overview(baseline: &TimingSummary, candidate: &TimingSummary) -> Vec<OverviewRow> {
    OVERVIEW_METRICS
        .iter()
        .map(|metric| OverviewRow {
            metric: *metric,
            baseline_ms: metric.pick(baseline),
            candidate_ms: metric.pick(candidate),
        })
        .collect()
}

/// Paired result of two independent benchmark runs plus the derived views.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub baseline: BenchmarkReport,
    pub candidate: BenchmarkReport,
    /// Empty when either side has no successful samples.
    pub overview: Vec<OverviewRow>,
    pub distribution: DualHistogram,
    pub series: DualTimeSeries,
}

/// Assemble the comparison views from two finished reports.
pub fn compare(baseline: BenchmarkReport, candidate: BenchmarkReport) -> ComparisonReport {
    let overview = match (&baseline.stats.timing, &candidate.stats.timing) {
        (Some(b), Some(c)) => overview(b, c),
        _ => Vec::new(),
    };
    let distribution = bin_pair(
        &crate::stats::aggregate::successful_times_ms(&baseline.samples),
        &crate::stats::aggregate::successful_times_ms(&candidate.samples),
    );
    let series = dual_time_series(&baseline.samples, &candidate.samples);
    ComparisonReport {
        baseline,
        candidate,
        overview,
        distribution,
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::Outcome;
    use crate::harness::BenchmarkReport;
    use std::time::Duration;

    fn ok(ms: u64) -> Outcome {
        Outcome::completed(Duration::from_millis(ms))
    }

    fn report_of(samples: Vec<Outcome>) -> BenchmarkReport {
        BenchmarkReport::from_samples(samples)
    }

    #[test]
    fn overview_has_five_paired_rows() {
        let baseline = report_of(vec![ok(10), ok(20), ok(30)]);
        let candidate = report_of(vec![ok(5), ok(15)]);
        let comparison = compare(baseline, candidate);
        assert_eq!(comparison.overview.len(), 5);
        let metrics: Vec<Metric> = comparison.overview.iter().map(|r| r.metric).collect();
        assert_eq!(
            metrics,
            vec![
                Metric::Mean,
                Metric::Median,
                Metric::Min,
                Metric::Max,
                Metric::StdDev
            ]
        );
        let mean_row = &comparison.overview[0];
        assert_eq!(mean_row.baseline_ms, 20.0);
        assert_eq!(mean_row.candidate_ms, 10.0);
    }

    #[test]
    fn overview_is_empty_when_one_side_all_failed() {
        let baseline = report_of(vec![ok(10)]);
        let candidate = report_of(vec![Outcome::thrown(Duration::from_millis(1), "boom")]);
        let comparison = compare(baseline, candidate);
        assert!(comparison.overview.is_empty());
        // The degenerate side still participates in the other views.
        assert_eq!(comparison.series.len, 1);
    }

    #[test]
    fn distribution_edges_are_shared() {
        let baseline = report_of((1..=40).map(ok).collect());
        let candidate = report_of((30..=90).map(ok).collect());
        let comparison = compare(baseline, candidate);
        assert_eq!(
            comparison.distribution.baseline.edges(),
            comparison.distribution.candidate.edges()
        );
    }

    #[test]
    fn unequal_lengths_are_not_padded() {
        let baseline = report_of((1..=7).map(ok).collect());
        let candidate = report_of((1..=3).map(ok).collect());
        let comparison = compare(baseline, candidate);
        assert_eq!(comparison.series.len, 7);
        assert_eq!(comparison.series.candidate_ms.len(), 3);
    }
}
