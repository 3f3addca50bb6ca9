/// Execution cell: one code string, one deadline, one outcome
///
/// The cell runs a snippet exactly once and races its settlement against a
/// deadline. The race resolves exactly once: for deferred evaluations the
/// single `recv_deadline` call is the settle point, and a settlement
/// arriving after the deadline lands on a dropped receiver and is a no-op.
///
/// A synchronous, non-deferred snippet cannot be cut off — the deadline is
/// only consulted at the await point, so a CPU-bound snippet that never
/// yields blocks the cell until it returns. True preemption of the *report*
/// requires isolated mode (see `exec::worker`).
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;

use crate::config::types::Outcome;
use crate::exec::engine::{Evaluation, SnippetEngine};
use crate::sandbox::{SandboxContext, Scope};

/// The one interface the aggregation side sees: inline and isolated cells
/// implement it identically, so consumers never know which ran.
pub trait SnippetCell {
    fn run(&mut self, code: &str, timeout: Duration) -> Outcome;
}

/// In-process cell: the snippet runs on the caller's thread.
pub struct ExecutionCell<E: SnippetEngine> {
    engine: E,
    scope: Scope,
    context: SandboxContext,
    policy: Option<String>,
}

impl<E: SnippetEngine> ExecutionCell<E> {
    /// Build a cell and harden its scope once. The context is an explicit
    /// configuration value; hardening never runs again for this cell.
    pub fn new(
        engine: E,
        mut scope: Scope,
        mut context: SandboxContext,
        policy: Option<String>,
    ) -> Self {
        let report = context.harden(&mut scope, policy.as_deref());
        if !report.skipped.is_empty() {
            log::debug!(
                "hardening left {} locked binding(s) in place",
                report.skipped.len()
            );
        }
        Self {
            engine,
            scope,
            context,
            policy,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

impl<E: SnippetEngine> SnippetCell for ExecutionCell<E> {
    fn run(&mut self, code: &str, timeout: Duration) -> Outcome {
        let start = Instant::now();
        let deadline = start + timeout;

        // Policy pass is idempotent and cheap; the full hardening sweep
        // already happened at construction.
        self.context.harden(&mut self.scope, self.policy.as_deref());

        match self.engine.eval(code, &self.scope) {
            // Synchronous settlement wins the race unconditionally; in a
            // cooperative regime the deadline cannot fire first.
            Evaluation::Ready(Ok(())) => Outcome::completed(start.elapsed()),
            Evaluation::Ready(Err(fault)) => Outcome::thrown(start.elapsed(), fault.message),
            Evaluation::Pending(settlement) => match settlement.recv_deadline(deadline) {
                Ok(Ok(())) => Outcome::completed(start.elapsed()),
                Ok(Err(fault)) => Outcome::thrown(start.elapsed(), fault.message),
                Err(RecvTimeoutError::Timeout) => Outcome::timed_out(start.elapsed()),
                // The engine dropped its sender without settling; that is
                // an engine fault, surfaced as a thrown outcome so the
                // sample stays in the sequence.
                Err(RecvTimeoutError::Disconnected) => {
                    Outcome::thrown(start.elapsed(), "snippet settlement channel closed")
                }
            },
        }
    }
}
