/// Isolated execution: a cell living in its own worker thread
///
/// The worker owns an [`ExecutionCell`] in an independently scheduled unit
/// and is reachable only through the run protocol. Host-side work cannot
/// delay its deadline timer. A runaway snippet still cannot be killed
/// mid-instruction by the protocol; the client's grace ceiling bounds the
/// *report*, and [`WorkerCell::terminate`] is the driver's explicit escape
/// hatch for discarding the whole unit.
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use crate::config::types::{BenchError, Outcome, Result};
use crate::exec::cell::{ExecutionCell, SnippetCell};
use crate::exec::engine::SnippetEngine;
use crate::exec::protocol::{RunRequest, RunResponse};
use crate::exec::shell::{ChildRegistry, ShellEngine};
use crate::sandbox::{SandboxContext, Scope};

/// Client handle for an isolated execution cell.
pub struct WorkerCell {
    requests: Option<Sender<RunRequest>>,
    responses: Receiver<RunResponse>,
    handle: Option<JoinHandle<()>>,
    policy: Option<String>,
    /// Extra wait beyond the deadline before the client reports the
    /// timeout itself. This is what bounds the report for a snippet that
    /// starves the worker thread entirely.
    response_grace: Duration,
    /// Shell process groups spawned inside the worker, for the abort path.
    children: Option<Arc<ChildRegistry>>,
}

impl WorkerCell {
    /// Spawn a worker owning the given engine. Hardening runs once inside
    /// the worker before it serves its first request.
    pub fn spawn<E>(
        engine: E,
        scope: Scope,
        context: SandboxContext,
        policy: Option<String>,
    ) -> Result<Self>
    where
        E: SnippetEngine + 'static,
    {
        Self::spawn_inner(engine, scope, context, policy, None)
    }

    /// Spawn a shell-backed worker wired to a child registry so
    /// [`terminate`](Self::terminate) can also reap runaway snippets.
    pub fn spawn_shell(
        scope: Scope,
        context: SandboxContext,
        policy: Option<String>,
    ) -> Result<Self> {
        let registry = ChildRegistry::new();
        let engine = ShellEngine::with_registry(Arc::clone(&registry));
        Self::spawn_inner(engine, scope, context, policy, Some(registry))
    }

    fn spawn_inner<E>(
        engine: E,
        scope: Scope,
        context: SandboxContext,
        policy: Option<String>,
        children: Option<Arc<ChildRegistry>>,
    ) -> Result<Self>
    where
        E: SnippetEngine + 'static,
    {
        let (request_tx, request_rx) = unbounded::<RunRequest>();
        let (response_tx, response_rx) = unbounded::<RunResponse>();
        let worker_policy = policy.clone();

        let handle = thread::Builder::new()
            .name("benchbox-worker".to_string())
            .spawn(move || {
                worker_loop(engine, scope, context, worker_policy, request_rx, response_tx)
            })
            .map_err(|e| BenchError::Worker(format!("failed to spawn worker thread: {e}")))?;

        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            handle: Some(handle),
            policy,
            response_grace: Duration::from_millis(50),
            children,
        })
    }

    pub fn with_response_grace(mut self, grace: Duration) -> Self {
        self.response_grace = grace;
        self
    }

    /// Discard the isolated unit: close the request channel (the worker
    /// exits at its next receive; a starved worker is leaked by design)
    /// and kill any registered shell process groups. Outcomes of runs
    /// after termination are `Aborted`.
    pub fn terminate(&mut self) {
        self.requests = None;
        if let Some(children) = &self.children {
            let killed = children.kill_all();
            if killed > 0 {
                log::warn!("terminated worker with {killed} live process group(s)");
            }
        }
        // Join only a worker that can actually exit; a detached handle is
        // dropped, never blocked on.
        if let Some(handle) = self.handle.take() {
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }
}

impl SnippetCell for WorkerCell {
    fn run(&mut self, code: &str, timeout: Duration) -> Outcome {
        let start = Instant::now();
        let requests = match &self.requests {
            Some(requests) => requests,
            None => return Outcome::aborted(start.elapsed(), "worker terminated"),
        };

        let request = RunRequest::new(code, timeout, self.policy.clone());
        let request_id = request.request_id;
        if requests.send(request).is_err() {
            return Outcome::aborted(start.elapsed(), "worker unavailable");
        }

        let ceiling = start + timeout + self.response_grace;
        loop {
            match self.responses.recv_deadline(ceiling) {
                Ok(response) if response.request_id == request_id => {
                    return response.into_outcome();
                }
                // Late settlement of an earlier, already-reported request.
                // Discarding it is the isolated-mode completed-flag: the
                // race resolves exactly once per request id.
                Ok(stale) => {
                    log::debug!("discarding stale response for request {}", stale.request_id);
                }
                // The worker went silent past the grace ceiling; report
                // the timeout ourselves. The worker is left running.
                Err(RecvTimeoutError::Timeout) => {
                    return Outcome::timed_out(start.elapsed());
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Outcome::aborted(start.elapsed(), "worker channel closed");
                }
            }
        }
    }
}

impl Drop for WorkerCell {
    fn drop(&mut self) {
        self.terminate();
    }
}

fn worker_loop<E: SnippetEngine>(
    engine: E,
    scope: Scope,
    context: SandboxContext,
    policy: Option<String>,
    requests: Receiver<RunRequest>,
    responses: Sender<RunResponse>,
) {
    // One-time hardening for this execution unit's lifetime.
    let mut cell = ExecutionCell::new(engine, scope, context, policy);
    log::debug!("worker cell ready");

    for request in requests.iter() {
        let outcome = cell.run(&request.code, request.timeout());
        if responses
            .send(RunResponse::from_outcome(request.request_id, &outcome))
            .is_err()
        {
            // Client went away; nothing left to report to.
            break;
        }
    }
    log::debug!("worker cell shut down");
}
