/// Aggregate statistics over a sample sequence
///
/// Numeric statistics are computed over the successful subsequence only and
/// are absent when every sample failed. Standard deviation is population
/// (divide by count, not count-1); the reliability bands are defined in
/// those units, so this choice is load-bearing, not stylistic.
use serde::{Deserialize, Serialize};

use crate::config::types::Outcome;

/// Central tendency and dispersion of successful sample times, in
/// milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimingSummary {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub std_dev_ms: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub success_count: usize,
    pub failed_count: usize,
    /// `None` iff `success_count == 0`.
    pub timing: Option<TimingSummary>,
}

/// Successful sample times in chronological order, in milliseconds.
pub fn successful_times_ms(samples: &[Outcome]) -> Vec<f64> {
    samples
        .iter()
        .filter(|s| s.succeeded())
        .map(Outcome::elapsed_ms)
        .collect()
}

/// Aggregate a finished sample sequence. Never fails, including on empty
/// and all-failed sequences.
pub fn aggregate(samples: &[Outcome]) -> AggregateStats {
    let times = successful_times_ms(samples);
    let success_count = times.len();
    let failed_count = samples.len() - success_count;

    let timing = if times.is_empty() {
        None
    } else {
        Some(summarize(&times))
    };

    AggregateStats {
        success_count,
        failed_count,
        timing,
    }
}

fn summarize(times: &[f64]) -> TimingSummary {
    let count = times.len() as f64;
    let mean = times.iter().sum::<f64>() / count;
    let variance = times.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / count;

    let mut sorted = times.to_vec();
    sorted.sort_by(f64::total_cmp);

    let median = if sorted.len() % 2 == 1 {
        sorted[sorted.len() / 2]
    } else {
        let hi = sorted.len() / 2;
        (sorted[hi - 1] + sorted[hi]) / 2.0
    };

    TimingSummary {
        mean_ms: mean,
        median_ms: median,
        min_ms: sorted[0],
        max_ms: sorted[sorted.len() - 1],
        std_dev_ms: variance.sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ok(ms: u64) -> Outcome {
        Outcome::completed(Duration::from_millis(ms))
    }

    fn failed() -> Outcome {
        Outcome::thrown(Duration::from_millis(1), "boom")
    }

    #[test]
    fn counts_partition_the_sequence() {
        let samples = vec![ok(1), failed(), ok(2), failed(), failed()];
        let stats = aggregate(&samples);
        assert_eq!(stats.success_count, 2);
        assert_eq!(stats.failed_count, 3);
        assert_eq!(stats.success_count + stats.failed_count, samples.len());
    }

    #[test]
    fn stats_are_ordered_for_all_success_sequences() {
        let samples = vec![ok(5), ok(1), ok(9), ok(3)];
        let timing = aggregate(&samples).timing.unwrap();
        assert!(timing.min_ms <= timing.median_ms);
        assert!(timing.median_ms <= timing.max_ms);
        assert!(timing.min_ms <= timing.mean_ms && timing.mean_ms <= timing.max_ms);
        assert_eq!(timing.min_ms, 1.0);
        assert_eq!(timing.max_ms, 9.0);
        assert_eq!(timing.median_ms, 4.0);
    }

    #[test]
    fn all_failed_sequence_has_no_timing() {
        let stats = aggregate(&[failed(), failed()]);
        assert_eq!(stats.success_count, 0);
        assert_eq!(stats.failed_count, 2);
        assert!(stats.timing.is_none());
    }

    #[test]
    fn empty_sequence_aggregates_to_zeroes() {
        let stats = aggregate(&[]);
        assert_eq!(stats.success_count, 0);
        assert_eq!(stats.failed_count, 0);
        assert!(stats.timing.is_none());
    }

    #[test]
    fn std_dev_is_population_not_sample() {
        // Values 2 and 4: population sigma is 1, sample sigma would be sqrt(2).
        let samples = vec![ok(2), ok(4)];
        let timing = aggregate(&samples).timing.unwrap();
        assert!((timing.std_dev_ms - 1.0).abs() < 1e-9);
    }

    #[test]
    fn odd_count_median_is_the_middle_value() {
        let samples = vec![ok(10), ok(30), ok(20)];
        let timing = aggregate(&samples).timing.unwrap();
        assert_eq!(timing.median_ms, 20.0);
    }

    #[test]
    fn failed_samples_do_not_skew_timing() {
        let with_failures = vec![ok(10), failed(), ok(20)];
        let clean = vec![ok(10), ok(20)];
        assert_eq!(
            aggregate(&with_failures).timing,
            aggregate(&clean).timing
        );
    }
}
