/// CLI entrypoint wiring for the benchbox binary
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use crate::config::types::{ExecMode, HarnessConfig};
use crate::harness::Harness;

#[derive(Parser)]
#[command(name = "benchbox", author, version, about = "Benchmark shell snippets under a sandboxed, timeout-bounded harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SamplingArgs {
    /// Discarded warmup runs before sampling
    #[arg(long, default_value_t = 5)]
    warmup: u32,
    /// Minimum number of samples
    #[arg(long, default_value_t = 5)]
    min_samples: usize,
    /// Maximum number of samples
    #[arg(long, default_value_t = 100)]
    max_samples: usize,
    /// Total sampling budget in milliseconds
    #[arg(long, default_value_t = 10_000)]
    max_time_ms: u64,
    /// Per-sample timeout in milliseconds
    #[arg(long, default_value_t = 5_000)]
    timeout_ms: u64,
    /// Run each snippet in an isolated worker instead of inline
    #[arg(long)]
    isolated: bool,
    /// Content policy descriptor forwarded to hardening
    #[arg(long)]
    policy: Option<String>,
    /// Extra capability binding to deny (repeatable)
    #[arg(long = "deny", value_name = "NAME")]
    denied: Vec<String>,
}

impl SamplingArgs {
    fn to_config(&self) -> HarnessConfig {
        HarnessConfig {
            warmup_iterations: self.warmup,
            min_samples: self.min_samples,
            max_samples: self.max_samples,
            max_total_time: Duration::from_millis(self.max_time_ms),
            sample_timeout: Duration::from_millis(self.timeout_ms),
            mode: if self.isolated {
                ExecMode::Isolated
            } else {
                ExecMode::Inline
            },
            policy: self.policy.clone(),
            extra_denied: self.denied.clone(),
            ..HarnessConfig::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Benchmark one shell snippet
    Run {
        /// Snippet passed to `sh -c`
        code: String,
        #[command(flatten)]
        sampling: SamplingArgs,
    },
    /// Benchmark two shell snippets and compare them
    Compare {
        /// Baseline snippet
        baseline: String,
        /// Candidate snippet
        candidate: String,
        #[command(flatten)]
        sampling: SamplingArgs,
    },
}

pub fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { code, sampling } => {
            let harness = Harness::new(sampling.to_config())?;
            let report = harness.benchmark(&code)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Compare {
            baseline,
            candidate,
            sampling,
        } => {
            let harness = Harness::new(sampling.to_config())?;
            let comparison = harness.compare(&baseline, &candidate)?;
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        }
    }

    Ok(())
}
