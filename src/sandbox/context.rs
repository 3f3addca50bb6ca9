/// Sandbox context: best-effort capability hardening
///
/// Before any snippet runs, the ambient capability surface of its scope is
/// minimized by removing a deny-list of bindings. Removal is best-effort:
/// a locked binding fails silently per name and never aborts hardening of
/// the rest. Hardening is a one-time, idempotent setup step per execution
/// unit; the strict-policy pass alone may be re-applied per request.
use std::collections::BTreeSet;

use crate::sandbox::scope::Scope;

/// Baseline deny-list, grouped by the capability family it cuts off:
/// network fetch (proxy bindings), crypto/agent sockets, cross-context
/// messaging (session bus), storage (XDG dirs), session/navigation
/// (display bindings), and code import (dynamic loader hooks).
pub const BASELINE_DENYLIST: &[&str] = &[
    "http_proxy",
    "https_proxy",
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "ALL_PROXY",
    "NO_PROXY",
    "SSH_AUTH_SOCK",
    "SSH_AGENT_PID",
    "GPG_AGENT_INFO",
    "DBUS_SESSION_BUS_ADDRESS",
    "DBUS_SYSTEM_BUS_ADDRESS",
    "XDG_RUNTIME_DIR",
    "XDG_DATA_HOME",
    "XDG_CACHE_HOME",
    "XDG_STATE_HOME",
    "DISPLAY",
    "WAYLAND_DISPLAY",
    "XAUTHORITY",
    "LD_PRELOAD",
    "LD_LIBRARY_PATH",
    "LD_AUDIT",
];

/// Marker that makes a policy descriptor maximally restrictive.
const STRICT_POLICY_MARKER: &str = "default-src 'none'";

/// Bindings forced off under a strict policy regardless of the configured
/// deny-list: the code-import hook and the network-fetch proxy.
const STRICT_FORCED: &[&str] = &["LD_PRELOAD", "http_proxy"];

/// What a hardening pass actually managed to do.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HardeningReport {
    pub removed: usize,
    /// Names whose removal failed (locked bindings). Swallowed, recorded
    /// only for diagnostics.
    pub skipped: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct SandboxContext {
    denylist: BTreeSet<String>,
    hardened: bool,
}

impl SandboxContext {
    /// Merge the baseline deny-list with caller-supplied extra names.
    /// The union is order-independent and deterministic.
    pub fn new<I, S>(extra_denied: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut denylist: BTreeSet<String> =
            BASELINE_DENYLIST.iter().map(|s| (*s).to_string()).collect();
        denylist.extend(extra_denied.into_iter().map(Into::into));
        Self {
            denylist,
            hardened: false,
        }
    }

    pub fn denylist(&self) -> impl Iterator<Item = &str> {
        self.denylist.iter().map(String::as_str)
    }

    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    /// Remove every denied binding from the scope, then apply the policy
    /// pass. The full sweep runs once per context lifetime; repeat calls
    /// only re-apply the policy pass.
    pub fn harden(&mut self, scope: &mut Scope, policy: Option<&str>) -> HardeningReport {
        let mut report = HardeningReport::default();
        if !self.hardened {
            for name in &self.denylist {
                match scope.remove(name) {
                    Ok(()) => report.removed += 1,
                    Err(_) => {
                        log::debug!("hardening skipped locked binding '{name}'");
                        report.skipped.push(name.clone());
                    }
                }
            }
            self.hardened = true;
        }
        self.apply_policy(scope, policy, &mut report);
        report
    }

    /// Strict-policy pass, safe to re-apply on every request.
    fn apply_policy(&self, scope: &mut Scope, policy: Option<&str>, report: &mut HardeningReport) {
        let strict = policy
            .map(|p| p.contains(STRICT_POLICY_MARKER))
            .unwrap_or(false);
        if !strict {
            return;
        }
        for name in STRICT_FORCED {
            match scope.remove(name) {
                Ok(()) => {}
                Err(_) => {
                    log::debug!("strict policy could not drop locked binding '{name}'");
                    report.skipped.push((*name).to_string());
                }
            }
        }
    }
}
