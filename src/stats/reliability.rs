/// Reliability classification of a sample sequence
///
/// Successful samples are bucketed by how far they deviate from the mean,
/// in units of the population standard deviation. Percentages are of the
/// whole sequence length, failed samples included, so present buckets sum
/// to 100%. The classification never comes back empty: an all-failed
/// sequence collapses to a single failed bucket and a fully degenerate
/// input yields a placeholder.
use serde::{Deserialize, Serialize};

use crate::config::types::Outcome;
use crate::stats::aggregate::{successful_times_ms, AggregateStats};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReliabilityBand {
    /// Within 0.5 sigma of the mean.
    HighlyConsistent,
    /// Between 0.5 and 1 sigma.
    ModeratelyConsistent,
    /// Beyond 1 sigma.
    Outlier,
    Failed,
    /// Placeholder emitted when every other bucket would be empty.
    NoData,
}

impl ReliabilityBand {
    pub fn name(&self) -> &'static str {
        match self {
            ReliabilityBand::HighlyConsistent => "Highly Consistent",
            ReliabilityBand::ModeratelyConsistent => "Moderately Consistent",
            ReliabilityBand::Outlier => "Performance Outliers",
            ReliabilityBand::Failed => "Failed Executions",
            ReliabilityBand::NoData => "No Data Available",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityBucket {
    pub band: ReliabilityBand,
    pub count: usize,
    /// Share of the whole sequence length, in percent.
    pub percent: f64,
}

impl ReliabilityBucket {
    /// Display-ready label, e.g. `Highly Consistent (43%)`.
    pub fn label(&self) -> String {
        format!("{} ({:.0}%)", self.band.name(), self.percent)
    }
}

/// Classify a finished sequence against its aggregate statistics. Bucket
/// order is fixed; empty buckets are omitted. Never fails.
pub fn classify(samples: &[Outcome], stats: &AggregateStats) -> Vec<ReliabilityBucket> {
    let total = samples.len();
    let percent_of = |count: usize| {
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64 * 100.0
        }
    };

    let mut buckets = Vec::new();

    if let Some(timing) = &stats.timing {
        let times = successful_times_ms(samples);
        let mean = timing.mean_ms;
        let sigma = timing.std_dev_ms;

        let highly = times
            .iter()
            .filter(|t| (**t - mean).abs() <= sigma * 0.5)
            .count();
        let moderately = times
            .iter()
            .filter(|t| {
                let dev = (**t - mean).abs();
                dev > sigma * 0.5 && dev <= sigma
            })
            .count();
        let outliers = times.iter().filter(|t| (**t - mean).abs() > sigma).count();

        for (band, count) in [
            (ReliabilityBand::HighlyConsistent, highly),
            (ReliabilityBand::ModeratelyConsistent, moderately),
            (ReliabilityBand::Outlier, outliers),
            (ReliabilityBand::Failed, stats.failed_count),
        ] {
            if count > 0 {
                buckets.push(ReliabilityBucket {
                    band,
                    count,
                    percent: percent_of(count),
                });
            }
        }
    } else if stats.failed_count > 0 {
        // No successful samples at all: the classification degenerates to
        // a single failed bucket sized to the failure count.
        buckets.push(ReliabilityBucket {
            band: ReliabilityBand::Failed,
            count: stats.failed_count,
            percent: percent_of(stats.failed_count),
        });
    }

    if buckets.is_empty() {
        buckets.push(ReliabilityBucket {
            band: ReliabilityBand::NoData,
            count: 0,
            percent: 0.0,
        });
    }

    buckets
}
