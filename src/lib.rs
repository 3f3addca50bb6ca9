//! benchbox: sandboxed snippet benchmarking with statistical reporting
//!
//! Run a code snippet repeatedly under a deadline and turn the resulting
//! sample sequence into a statistical picture of its performance.
//!
//! # Architecture
//!
//! ## Sandbox ([`sandbox`])
//! - [`sandbox::scope`]: named capability bindings handed to engines
//! - [`sandbox::context`]: deny-list hardening, best-effort per name
//!
//! ## Execution ([`exec`])
//! - [`exec::engine`]: the snippet evaluation seam (sync or deferred)
//! - [`exec::shell`]: `/bin/sh -c` engine with process-group control
//! - [`exec::cell`]: one snippet, one deadline, one outcome
//! - [`exec::protocol`]: request/response contract for isolated cells
//! - [`exec::worker`]: isolated cell in its own worker thread
//!
//! ## Statistics ([`stats`])
//! - [`stats::aggregate`]: mean/median/min/max/population sigma
//! - [`stats::reliability`]: sigma-band consistency classification
//! - [`stats::histogram`]: sqrt-rule binning, shared dual edges
//! - [`stats::series`]: time-series views, unpadded dual series
//! - [`stats::compare`]: side-by-side A/B views
//!
//! ## Driver
//! - [`harness`]: warmup + min/max/budget sampling cadence
//! - [`cli`]: command-line front end
//!
//! # Design principles
//!
//! 1. **Snippet failures are data** - a failed sample stays in the
//!    sequence; only harness faults are errors
//! 2. **The race settles once** - completion and deadline resolve to
//!    exactly one outcome per run
//! 3. **Report-bounded, not kill-bounded** - a timeout bounds the report,
//!    never the snippet; termination is a separate, explicit driver action
//! 4. **Best-effort hardening** - capability removal is hygiene, not a
//!    security boundary

pub mod cli;
pub mod config;
pub mod exec;
pub mod harness;
pub mod sandbox;
pub mod stats;

pub use config::types::{
    BenchError, ExecMode, FailureKind, HarnessConfig, Outcome, Result, Verdict, TIMEOUT_MESSAGE,
};
pub use exec::{ExecutionCell, FixtureEngine, ShellEngine, SnippetCell, SnippetEngine, WorkerCell};
pub use harness::{BenchmarkReport, Harness};
pub use sandbox::{SandboxContext, Scope};
pub use stats::{AggregateStats, ComparisonReport, Histogram, ReliabilityBucket, TimingSummary};
