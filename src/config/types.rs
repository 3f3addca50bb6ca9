/// Core types shared across the benchbox harness
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Fixed failure text reported when the deadline wins the settle race.
///
/// Consumers that pattern-match failure messages rely on this exact string,
/// so it is a published constant rather than an inline literal.
pub const TIMEOUT_MESSAGE: &str = "Execution timeout";

/// How one execution attempt ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    /// The snippet settled successfully before the deadline.
    Completed,
    /// The snippet threw synchronously or settled with an error.
    Thrown { message: String },
    /// The deadline fired before the snippet settled.
    TimedOut,
    /// The execution unit was discarded by the driver before settlement.
    Aborted { reason: String },
}

/// Wire-level failure tag carried alongside the legacy message text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Thrown,
    Timeout,
    Aborted,
}

impl Verdict {
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Verdict::Completed => None,
            Verdict::Thrown { .. } => Some(FailureKind::Thrown),
            Verdict::TimedOut => Some(FailureKind::Timeout),
            Verdict::Aborted { .. } => Some(FailureKind::Aborted),
        }
    }
}

/// Result of one execution attempt.
///
/// `elapsed` is always measured against the same monotonic start regardless
/// of how the attempt ended; on timeout it sits at the deadline value
/// observed at cancellation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub elapsed: Duration,
    pub verdict: Verdict,
}

impl Outcome {
    pub fn completed(elapsed: Duration) -> Self {
        Self {
            elapsed,
            verdict: Verdict::Completed,
        }
    }

    pub fn thrown(elapsed: Duration, message: impl Into<String>) -> Self {
        Self {
            elapsed,
            verdict: Verdict::Thrown {
                message: message.into(),
            },
        }
    }

    pub fn timed_out(elapsed: Duration) -> Self {
        Self {
            elapsed,
            verdict: Verdict::TimedOut,
        }
    }

    pub fn aborted(elapsed: Duration, reason: impl Into<String>) -> Self {
        Self {
            elapsed,
            verdict: Verdict::Aborted {
                reason: reason.into(),
            },
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.verdict, Verdict::Completed)
    }

    /// Human-readable failure text; `None` for successful outcomes.
    pub fn error_message(&self) -> Option<&str> {
        match &self.verdict {
            Verdict::Completed => None,
            Verdict::Thrown { message } => Some(message),
            Verdict::TimedOut => Some(TIMEOUT_MESSAGE),
            Verdict::Aborted { reason } => Some(reason),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Scheduling regime for the execution cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecMode {
    /// Run on the caller's thread; only deferred settlements can time out.
    Inline,
    /// Run in a dedicated worker reachable through the run protocol.
    Isolated,
}

/// Sampling and execution configuration for the harness.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Discarded runs executed before sampling begins.
    pub warmup_iterations: u32,
    /// Samples always collected, regardless of the time budget.
    pub min_samples: usize,
    /// Hard cap on collected samples.
    pub max_samples: usize,
    /// Total sampling time budget, checked once `min_samples` is reached.
    pub max_total_time: Duration,
    /// Per-sample deadline handed to the execution cell.
    pub sample_timeout: Duration,
    /// Extra wait beyond the deadline before the isolated-mode client
    /// gives up on a silent worker and reports the timeout itself.
    pub response_grace: Duration,
    pub mode: ExecMode,
    /// Content policy descriptor forwarded to hardening.
    pub policy: Option<String>,
    /// Capability names denied in addition to the baseline list.
    pub extra_denied: Vec<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            warmup_iterations: 5,
            min_samples: 5,
            max_samples: 100,
            max_total_time: Duration::from_secs(10),
            sample_timeout: Duration::from_secs(5),
            response_grace: Duration::from_millis(50),
            mode: ExecMode::Inline,
            policy: None,
            extra_denied: Vec::new(),
        }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_samples == 0 {
            return Err(BenchError::Config(
                "max_samples must be at least 1".to_string(),
            ));
        }
        if self.min_samples > self.max_samples {
            return Err(BenchError::Config(format!(
                "min_samples ({}) exceeds max_samples ({})",
                self.min_samples, self.max_samples
            )));
        }
        if self.sample_timeout.is_zero() {
            return Err(BenchError::Config(
                "sample_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Harness-level faults. Snippet failures are never errors; they surface
/// as failed [`Outcome`]s inside the sample sequence.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_outcome_keeps_legacy_message_text() {
        let outcome = Outcome::timed_out(Duration::from_millis(50));
        assert!(!outcome.succeeded());
        assert_eq!(outcome.error_message(), Some("Execution timeout"));
        assert_eq!(outcome.verdict.failure_kind(), Some(FailureKind::Timeout));
    }

    #[test]
    fn completed_outcome_has_no_message() {
        let outcome = Outcome::completed(Duration::from_micros(10));
        assert!(outcome.succeeded());
        assert_eq!(outcome.error_message(), None);
        assert_eq!(outcome.verdict.failure_kind(), None);
    }

    #[test]
    fn config_rejects_inverted_sample_bounds() {
        let config = HarnessConfig {
            min_samples: 10,
            max_samples: 3,
            ..HarnessConfig::default()
        };
        assert!(matches!(config.validate(), Err(BenchError::Config(_))));
    }

    #[test]
    fn config_rejects_zero_timeout() {
        let config = HarnessConfig {
            sample_timeout: Duration::ZERO,
            ..HarnessConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_config_is_valid() {
        assert!(HarnessConfig::default().validate().is_ok());
    }
}
