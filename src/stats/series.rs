/// Time-series views of a sample sequence
///
/// The only place sample order matters: successful times are kept in
/// chronological order, with the mean as a constant overlay. The dual view
/// spans the longer series; the shorter one simply stops at its own length,
/// never truncated and never extrapolated.
use serde::{Deserialize, Serialize};

use crate::config::types::Outcome;
use crate::stats::aggregate::{successful_times_ms, AggregateStats};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Successful sample times in execution order, in milliseconds.
    pub samples_ms: Vec<f64>,
    /// Mean overlay; absent when there were no successful samples.
    pub mean_ms: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DualTimeSeries {
    /// X-axis length: the longer of the two series.
    pub len: usize,
    pub baseline_ms: Vec<f64>,
    pub candidate_ms: Vec<f64>,
}

pub fn time_series(samples: &[Outcome], stats: &AggregateStats) -> TimeSeries {
    TimeSeries {
        samples_ms: successful_times_ms(samples),
        mean_ms: stats.timing.as_ref().map(|t| t.mean_ms),
    }
}

pub fn dual_time_series(baseline: &[Outcome], candidate: &[Outcome]) -> DualTimeSeries {
    let baseline_ms = successful_times_ms(baseline);
    let candidate_ms = successful_times_ms(candidate);
    DualTimeSeries {
        len: baseline_ms.len().max(candidate_ms.len()),
        baseline_ms,
        candidate_ms,
    }
}
