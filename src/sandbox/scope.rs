/// Capability scope handed to snippet engines
///
/// A scope is a named binding table: for process-backed engines the
/// bindings become the child environment, for in-process engines they are
/// plain read-only lookups. Some bindings are locked — the host refuses to
/// drop them because the engine itself needs them (e.g. `PATH` to resolve
/// the shell). Removing a locked binding fails the same way a read-only
/// global does in the original execution scope; callers are expected to
/// swallow that failure per name.
use std::collections::{BTreeMap, BTreeSet};

use crate::config::types::{BenchError, Result};

/// Binding names kept alive even when a deny-list asks for their removal.
const LOCKED_BINDINGS: &[&str] = &["PATH", "HOME", "SHELL"];

#[derive(Clone, Debug, Default)]
pub struct Scope {
    bindings: BTreeMap<String, String>,
    locked: BTreeSet<String>,
}

impl Scope {
    /// Empty scope with no bindings and no locked names.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot the host environment, locking the bindings the engines
    /// need to keep functioning.
    pub fn from_host_env() -> Self {
        let mut scope = Self {
            bindings: std::env::vars().collect(),
            locked: BTreeSet::new(),
        };
        for name in LOCKED_BINDINGS {
            scope.locked.insert((*name).to_string());
        }
        scope
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.bindings.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Mark a binding as not removable.
    pub fn lock(&mut self, name: impl Into<String>) {
        self.locked.insert(name.into());
    }

    pub fn is_locked(&self, name: &str) -> bool {
        self.locked.contains(name)
    }

    /// Drop a binding. Removing an absent binding is a no-op; removing a
    /// locked binding fails and leaves the binding in place.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        if self.locked.contains(name) {
            return Err(BenchError::Config(format!(
                "binding '{name}' is locked and cannot be removed"
            )));
        }
        self.bindings.remove(name);
        Ok(())
    }

    /// Bindings in deterministic name order, ready for `Command::envs`.
    pub fn to_env(&self) -> Vec<(String, String)> {
        self.bindings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
