/// Histogram binning for timing distributions
///
/// Pure and deterministic: the same values always produce the same bins,
/// and bins do not depend on input order. Bin count follows the square-root
/// rule clamped to `[min_bins, max_bins]`; the last bin is inclusive of the
/// maximum by index clamping.
use serde::{Deserialize, Serialize};

/// Default bin-count floor.
pub const MIN_BINS: usize = 5;
/// Bin-count cap for a single-series histogram.
pub const SINGLE_MAX_BINS: usize = 20;
/// Tighter cap for the dual-series comparison histogram.
pub const DUAL_MAX_BINS: usize = 15;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub lo_ms: f64,
    pub hi_ms: f64,
    pub count: usize,
}

impl Bin {
    /// Display-ready range label, e.g. `0.12-0.45`.
    pub fn label(&self) -> String {
        format!("{:.2}-{:.2}", self.lo_ms, self.hi_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<Bin>,
}

impl Histogram {
    pub fn total_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// Bin edges as `(lo, hi)` pairs, for comparing edge sets.
    pub fn edges(&self) -> Vec<(f64, f64)> {
        self.bins.iter().map(|b| (b.lo_ms, b.hi_ms)).collect()
    }
}

/// Dual histogram sharing one bin edge set, so both series are directly
/// comparable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DualHistogram {
    pub baseline: Histogram,
    pub candidate: Histogram,
}

fn bin_count_for(n: usize, max_bins: usize, min_bins: usize) -> usize {
    let sqrt_rule = (n as f64).sqrt().ceil() as usize;
    sqrt_rule.clamp(min_bins, max_bins)
}

struct Edges {
    min: f64,
    width: f64,
    count: usize,
}

impl Edges {
    fn from_range(min: f64, max: f64, n: usize, max_bins: usize, min_bins: usize) -> Self {
        // A flat range degenerates to a single bin spanning [min, max].
        if max == min {
            return Self {
                min,
                width: 0.0,
                count: 1,
            };
        }
        let count = bin_count_for(n, max_bins, min_bins);
        Self {
            min,
            width: (max - min) / count as f64,
            count,
        }
    }

    fn index_of(&self, value: f64) -> usize {
        if self.width == 0.0 {
            return 0;
        }
        // Clamping keeps value == max inside the last bin.
        (((value - self.min) / self.width) as usize).min(self.count - 1)
    }

    fn fill(&self, values: &[f64]) -> Histogram {
        let mut counts = vec![0usize; self.count];
        for value in values {
            counts[self.index_of(*value)] += 1;
        }
        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| Bin {
                lo_ms: self.min + i as f64 * self.width,
                hi_ms: if self.width == 0.0 {
                    self.min
                } else {
                    self.min + (i + 1) as f64 * self.width
                },
                count,
            })
            .collect();
        Histogram { bins }
    }
}

fn range_of(values: &[f64]) -> Option<(f64, f64)> {
    let mut iter = values.iter();
    let first = *iter.next()?;
    let mut min = first;
    let mut max = first;
    for v in iter {
        min = min.min(*v);
        max = max.max(*v);
    }
    Some((min, max))
}

/// Bin one series. An empty input yields an empty histogram, never an
/// error.
pub fn bin(values: &[f64], max_bins: usize, min_bins: usize) -> Histogram {
    match range_of(values) {
        None => Histogram::default(),
        Some((min, max)) => {
            Edges::from_range(min, max, values.len(), max_bins, min_bins).fill(values)
        }
    }
}

/// Bin two series onto one shared edge set computed from the union of both
/// ranges, with the dual-series bin cap.
pub fn bin_pair(baseline: &[f64], candidate: &[f64]) -> DualHistogram {
    let union: Vec<f64> = baseline.iter().chain(candidate.iter()).copied().collect();
    match range_of(&union) {
        None => DualHistogram {
            baseline: Histogram::default(),
            candidate: Histogram::default(),
        },
        Some((min, max)) => {
            let edges = Edges::from_range(min, max, union.len(), DUAL_MAX_BINS, MIN_BINS);
            DualHistogram {
                baseline: edges.fill(baseline),
                candidate: edges.fill(candidate),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_sum_to_input_length() {
        let values: Vec<f64> = (0..137).map(|i| (i % 31) as f64).collect();
        let histogram = bin(&values, SINGLE_MAX_BINS, MIN_BINS);
        assert_eq!(histogram.total_count(), values.len());
    }

    #[test]
    fn binning_is_order_independent() {
        let values: Vec<f64> = vec![5.0, 1.0, 9.0, 3.0, 3.0, 7.0, 2.0, 8.0];
        let mut reversed = values.clone();
        reversed.reverse();
        assert_eq!(
            bin(&values, SINGLE_MAX_BINS, MIN_BINS),
            bin(&reversed, SINGLE_MAX_BINS, MIN_BINS)
        );
    }

    #[test]
    fn bin_count_follows_clamped_sqrt_rule() {
        // 9 values: sqrt rule says 3, floor lifts it to 5.
        let values: Vec<f64> = (0..9).map(|i| i as f64).collect();
        assert_eq!(bin(&values, SINGLE_MAX_BINS, MIN_BINS).bins.len(), 5);

        // 10_000 values: sqrt rule says 100, cap holds it at 20.
        let values: Vec<f64> = (0..10_000).map(|i| (i % 97) as f64).collect();
        assert_eq!(bin(&values, SINGLE_MAX_BINS, MIN_BINS).bins.len(), 20);

        // 49 values: sqrt rule says exactly 7.
        let values: Vec<f64> = (0..49).map(|i| i as f64).collect();
        assert_eq!(bin(&values, SINGLE_MAX_BINS, MIN_BINS).bins.len(), 7);
    }

    #[test]
    fn maximum_lands_in_the_last_bin() {
        let values: Vec<f64> = (0..49).map(|i| i as f64).collect();
        let histogram = bin(&values, SINGLE_MAX_BINS, MIN_BINS);
        assert!(histogram.bins.last().unwrap().count > 0);
        assert_eq!(histogram.total_count(), values.len());
    }

    #[test]
    fn flat_range_degenerates_to_one_bin() {
        let values = vec![4.2; 12];
        let histogram = bin(&values, SINGLE_MAX_BINS, MIN_BINS);
        assert_eq!(histogram.bins.len(), 1);
        assert_eq!(histogram.bins[0].lo_ms, 4.2);
        assert_eq!(histogram.bins[0].hi_ms, 4.2);
        assert_eq!(histogram.bins[0].count, 12);
    }

    #[test]
    fn empty_input_yields_empty_histogram() {
        let histogram = bin(&[], SINGLE_MAX_BINS, MIN_BINS);
        assert!(histogram.bins.is_empty());
    }

    #[test]
    fn dual_series_share_identical_edges() {
        let baseline: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let candidate: Vec<f64> = (20..90).map(|i| i as f64).collect();
        let dual = bin_pair(&baseline, &candidate);
        assert_eq!(dual.baseline.edges(), dual.candidate.edges());
        assert_eq!(dual.baseline.total_count(), baseline.len());
        assert_eq!(dual.candidate.total_count(), candidate.len());
    }

    #[test]
    fn dual_cap_is_fifteen() {
        let baseline: Vec<f64> = (0..500).map(|i| (i % 53) as f64).collect();
        let candidate: Vec<f64> = (0..500).map(|i| (i % 71) as f64).collect();
        let dual = bin_pair(&baseline, &candidate);
        assert_eq!(dual.baseline.bins.len(), 15);
    }

    #[test]
    fn dual_with_one_empty_side_still_bins_the_other() {
        let baseline: Vec<f64> = (0..36).map(|i| i as f64).collect();
        let dual = bin_pair(&baseline, &[]);
        assert_eq!(dual.baseline.total_count(), baseline.len());
        assert_eq!(dual.candidate.total_count(), 0);
        assert_eq!(dual.baseline.edges(), dual.candidate.edges());
    }

    #[test]
    fn dual_with_both_empty_is_empty() {
        let dual = bin_pair(&[], &[]);
        assert!(dual.baseline.bins.is_empty());
        assert!(dual.candidate.bins.is_empty());
    }
}
