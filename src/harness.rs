/// Sampling harness: drives an execution cell and aggregates the result
///
/// The harness owns the sampling cadence — warmup runs, minimum and maximum
/// sample counts, and the total time budget — and hands the finished sample
/// sequence to the aggregation pipeline. Cadence is fixed, never adaptive.
/// Failed samples stay in the sequence; they never abort the run.
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::types::{ExecMode, HarnessConfig, Outcome, Result};
use crate::exec::cell::{ExecutionCell, SnippetCell};
use crate::exec::shell::ShellEngine;
use crate::exec::worker::WorkerCell;
use crate::sandbox::{SandboxContext, Scope};
use crate::stats::aggregate::{aggregate, successful_times_ms, AggregateStats};
use crate::stats::compare::{compare, ComparisonReport};
use crate::stats::histogram::{bin, Histogram, MIN_BINS, SINGLE_MAX_BINS};
use crate::stats::reliability::{classify, ReliabilityBucket};
use crate::stats::series::{time_series, TimeSeries};

/// Display-ready result of one benchmark run. Immutable once built; every
/// view is recomputed fresh from the sample sequence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub samples: Vec<Outcome>,
    pub stats: AggregateStats,
    pub reliability: Vec<ReliabilityBucket>,
    pub histogram: Histogram,
    pub series: TimeSeries,
}

impl BenchmarkReport {
    pub fn from_samples(samples: Vec<Outcome>) -> Self {
        let stats = aggregate(&samples);
        let reliability = classify(&samples, &stats);
        let histogram = bin(&successful_times_ms(&samples), SINGLE_MAX_BINS, MIN_BINS);
        let series = time_series(&samples, &stats);
        Self {
            samples,
            stats,
            reliability,
            histogram,
            series,
        }
    }
}

pub struct Harness {
    config: HarnessConfig,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run the full sampling cadence against a caller-provided cell.
    pub fn benchmark_with<C: SnippetCell + ?Sized>(&self, cell: &mut C, code: &str) -> BenchmarkReport {
        for i in 0..self.config.warmup_iterations {
            let outcome = cell.run(code, self.config.sample_timeout);
            log::debug!(
                "warmup {}/{}: {:?}",
                i + 1,
                self.config.warmup_iterations,
                outcome.verdict
            );
        }

        let budget_start = Instant::now();
        let mut samples = Vec::with_capacity(self.config.min_samples);
        while samples.len() < self.config.max_samples {
            if samples.len() >= self.config.min_samples
                && budget_start.elapsed() >= self.config.max_total_time
            {
                break;
            }
            samples.push(cell.run(code, self.config.sample_timeout));
        }
        log::debug!(
            "collected {} sample(s) in {:?}",
            samples.len(),
            budget_start.elapsed()
        );

        BenchmarkReport::from_samples(samples)
    }

    /// Benchmark a shell snippet with a cell built per the configured mode.
    pub fn benchmark(&self, code: &str) -> Result<BenchmarkReport> {
        let mut cell = self.build_shell_cell()?;
        Ok(self.benchmark_with(cell.as_mut(), code))
    }

    /// Benchmark two shell snippets on independent cells and assemble the
    /// comparison views. No state is shared between the two runs.
    pub fn compare(&self, baseline_code: &str, candidate_code: &str) -> Result<ComparisonReport> {
        let baseline = self.benchmark(baseline_code)?;
        let candidate = self.benchmark(candidate_code)?;
        Ok(compare(baseline, candidate))
    }

    fn build_shell_cell(&self) -> Result<Box<dyn SnippetCell>> {
        let scope = Scope::from_host_env();
        let context = SandboxContext::new(self.config.extra_denied.clone());
        match self.config.mode {
            ExecMode::Inline => Ok(Box::new(ExecutionCell::new(
                ShellEngine::new(),
                scope,
                context,
                self.config.policy.clone(),
            ))),
            ExecMode::Isolated => {
                let worker = WorkerCell::spawn_shell(scope, context, self.config.policy.clone())?
                    .with_response_grace(self.config.response_grace);
                Ok(Box::new(worker))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::engine::{FixtureEngine, SnippetFault};
    use std::time::Duration;

    fn harness(config: HarnessConfig) -> Harness {
        Harness::new(config).expect("valid config")
    }

    fn fixture_cell(engine: FixtureEngine) -> ExecutionCell<FixtureEngine> {
        ExecutionCell::new(
            engine,
            Scope::empty(),
            SandboxContext::new(Vec::<String>::new()),
            None,
        )
    }

    #[test]
    fn collects_between_min_and_max_samples() {
        let mut engine = FixtureEngine::new();
        engine.register("fast", |_| Ok(()));
        let mut cell = fixture_cell(engine);
        let config = HarnessConfig {
            warmup_iterations: 1,
            min_samples: 4,
            max_samples: 12,
            max_total_time: Duration::from_secs(5),
            ..HarnessConfig::default()
        };
        let report = harness(config).benchmark_with(&mut cell, "fast");
        assert!(report.samples.len() >= 4);
        assert!(report.samples.len() <= 12);
        assert_eq!(
            report.stats.success_count + report.stats.failed_count,
            report.samples.len()
        );
    }

    #[test]
    fn exhausted_budget_stops_at_min_samples() {
        let mut engine = FixtureEngine::new();
        engine.register("slowish", |_| {
            std::thread::sleep(Duration::from_millis(5));
            Ok(())
        });
        let mut cell = fixture_cell(engine);
        let config = HarnessConfig {
            warmup_iterations: 0,
            min_samples: 3,
            max_samples: 1000,
            max_total_time: Duration::ZERO,
            ..HarnessConfig::default()
        };
        let report = harness(config).benchmark_with(&mut cell, "slowish");
        assert_eq!(report.samples.len(), 3);
    }

    #[test]
    fn failed_samples_never_abort_the_run() {
        let mut engine = FixtureEngine::new();
        engine.register("flaky", {
            let mut calls = 0u32;
            move |_| {
                calls += 1;
                if calls % 2 == 0 {
                    Err(SnippetFault::new("boom"))
                } else {
                    Ok(())
                }
            }
        });
        let mut cell = fixture_cell(engine);
        let config = HarnessConfig {
            warmup_iterations: 0,
            min_samples: 6,
            max_samples: 6,
            ..HarnessConfig::default()
        };
        let report = harness(config).benchmark_with(&mut cell, "flaky");
        assert_eq!(report.samples.len(), 6);
        assert!(report.stats.failed_count > 0);
        assert!(report.stats.success_count > 0);
    }

    #[test]
    fn report_views_are_consistent() {
        let mut engine = FixtureEngine::new();
        engine.register("fast", |_| Ok(()));
        let mut cell = fixture_cell(engine);
        let config = HarnessConfig {
            warmup_iterations: 0,
            min_samples: 8,
            max_samples: 8,
            ..HarnessConfig::default()
        };
        let report = harness(config).benchmark_with(&mut cell, "fast");
        assert_eq!(report.histogram.total_count(), report.stats.success_count);
        assert_eq!(report.series.samples_ms.len(), report.stats.success_count);
        assert!(!report.reliability.is_empty());
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = HarnessConfig {
            min_samples: 9,
            max_samples: 2,
            ..HarnessConfig::default()
        };
        assert!(Harness::new(config).is_err());
    }
}
