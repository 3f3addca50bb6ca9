pub mod aggregate;
pub mod compare;
pub mod histogram;
pub mod reliability;
pub mod series;

pub use aggregate::{aggregate, AggregateStats, TimingSummary};
pub use compare::{compare, overview, ComparisonReport, Metric, OverviewRow};
pub use histogram::{
    bin, bin_pair, Bin, DualHistogram, Histogram, DUAL_MAX_BINS, MIN_BINS, SINGLE_MAX_BINS,
};
pub use reliability::{classify, ReliabilityBand, ReliabilityBucket};
pub use series::{dual_time_series, time_series, DualTimeSeries, TimeSeries};
