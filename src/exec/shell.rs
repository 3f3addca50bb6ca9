/// Shell-backed snippet engine
///
/// Runs the code string as `sh -c <code>` with the child environment built
/// from the hardened scope. The child is placed in its own process group so
/// the driver's abort path can signal the whole group without touching the
/// harness. Timeouts never kill the child; only an explicit
/// [`ChildRegistry::kill_all`] does.
use std::collections::BTreeSet;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam_channel::bounded;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::{setpgid, Pid};

use crate::exec::engine::{Evaluation, SnippetEngine, SnippetFault};
use crate::sandbox::Scope;

/// Longest stderr excerpt carried into a failure message.
const STDERR_EXCERPT_LIMIT: usize = 512;

/// Wait between SIGTERM and SIGKILL during escalation.
const KILL_ESCALATION_DELAY: Duration = Duration::from_millis(100);

/// Live process groups spawned by shell engines.
///
/// Shared between the engine (which registers and unregisters children as
/// they spawn and reap) and the driver (which may escalate a kill after
/// terminating a worker).
#[derive(Debug, Default)]
pub struct ChildRegistry {
    groups: Mutex<BTreeSet<i32>>,
}

impl ChildRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn register(&self, pgid: i32) {
        self.groups.lock().unwrap_or_else(|e| e.into_inner()).insert(pgid);
    }

    fn unregister(&self, pgid: i32) {
        self.groups.lock().unwrap_or_else(|e| e.into_inner()).remove(&pgid);
    }

    pub fn live_groups(&self) -> usize {
        self.groups.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// TERM then KILL every live group. Returns the number of groups
    /// signaled. Signal errors on already-gone groups are ignored.
    pub fn kill_all(&self) -> usize {
        let groups: Vec<i32> = {
            let guard = self.groups.lock().unwrap_or_else(|e| e.into_inner());
            guard.iter().copied().collect()
        };
        for pgid in &groups {
            let _ = killpg(Pid::from_raw(*pgid), Signal::SIGTERM);
        }
        if !groups.is_empty() {
            thread::sleep(KILL_ESCALATION_DELAY);
            for pgid in &groups {
                let _ = killpg(Pid::from_raw(*pgid), Signal::SIGKILL);
            }
        }
        groups.len()
    }
}

pub struct ShellEngine {
    shell: PathBuf,
    registry: Arc<ChildRegistry>,
}

impl ShellEngine {
    pub fn new() -> Self {
        Self::with_registry(ChildRegistry::new())
    }

    pub fn with_registry(registry: Arc<ChildRegistry>) -> Self {
        Self {
            shell: PathBuf::from("/bin/sh"),
            registry,
        }
    }

    pub fn with_shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn registry(&self) -> Arc<ChildRegistry> {
        Arc::clone(&self.registry)
    }
}

impl Default for ShellEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn describe_exit(status: std::process::ExitStatus, stderr: &[u8]) -> String {
    use std::os::unix::process::ExitStatusExt;

    let excerpt = String::from_utf8_lossy(stderr);
    let excerpt = excerpt.trim();
    let excerpt: String = excerpt.chars().take(STDERR_EXCERPT_LIMIT).collect();
    let base = match (status.code(), status.signal()) {
        (Some(code), _) => format!("exited with status {code}"),
        (None, Some(sig)) => format!("terminated by signal {sig}"),
        (None, None) => "exited abnormally".to_string(),
    };
    if excerpt.is_empty() {
        base
    } else {
        format!("{base}: {excerpt}")
    }
}

impl SnippetEngine for ShellEngine {
    fn eval(&mut self, code: &str, scope: &Scope) -> Evaluation {
        let mut command = Command::new(&self.shell);
        command
            .arg("-c")
            .arg(code)
            .env_clear()
            .envs(scope.to_env())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // New process group, so abort escalation signals the snippet's
        // whole subtree and never the harness.
        unsafe {
            command.pre_exec(|| {
                setpgid(Pid::from_raw(0), Pid::from_raw(0)).map_err(std::io::Error::from)
            });
        }

        let child = match command.spawn() {
            Ok(child) => child,
            // Spawn failure is the synchronous-throw path.
            Err(err) => {
                return Evaluation::Ready(Err(SnippetFault::new(format!(
                    "failed to start shell: {err}"
                ))))
            }
        };

        let pgid = child.id() as i32;
        self.registry.register(pgid);

        let (settle_tx, settle_rx) = bounded(1);
        let registry = Arc::clone(&self.registry);
        thread::spawn(move || {
            let result = match child.wait_with_output() {
                Ok(output) if output.status.success() => Ok(()),
                Ok(output) => Err(SnippetFault::new(describe_exit(
                    output.status,
                    &output.stderr,
                ))),
                Err(err) => Err(SnippetFault::new(format!("wait failed: {err}"))),
            };
            registry.unregister(pgid);
            // The receiver may be gone if the deadline already fired; a
            // late settlement is a no-op.
            let _ = settle_tx.send(result);
        });

        Evaluation::Pending(settle_rx)
    }
}
