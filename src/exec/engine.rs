/// Snippet engine seam
///
/// An engine turns a code string into one evaluation against a hardened
/// scope. Evaluation either settles synchronously (`Ready`, including a
/// synchronous throw) or hands back a settlement channel (`Pending`) that
/// the execution cell races against its deadline.
use std::collections::HashMap;

use crossbeam_channel::Receiver;

use crate::sandbox::Scope;

/// Failure raised by the snippet itself, as opposed to the harness.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnippetFault {
    pub message: String,
}

impl SnippetFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type SnippetResult = std::result::Result<(), SnippetFault>;

/// One evaluation of a code string.
pub enum Evaluation {
    /// Settled before returning to the cell.
    Ready(SnippetResult),
    /// Deferred; settles at most once on the channel.
    Pending(Receiver<SnippetResult>),
}

/// The evaluation seam between the execution cell and whatever actually
/// runs snippets. Implementations must be `Send` so a cell can live inside
/// an isolated worker.
pub trait SnippetEngine: Send {
    fn eval(&mut self, code: &str, scope: &Scope) -> Evaluation;
}

type FixtureFn = Box<dyn FnMut(&Scope) -> Evaluation + Send>;

/// In-process engine resolving code strings as registered snippet names.
///
/// Used by tests and inline demos where the benchmarked work is a Rust
/// closure rather than an external program. Unknown names throw, the same
/// way an eval of garbage throws.
#[derive(Default)]
pub struct FixtureEngine {
    snippets: HashMap<String, FixtureFn>,
}

impl FixtureEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a synchronously settling snippet.
    pub fn register<F>(&mut self, name: impl Into<String>, mut snippet: F)
    where
        F: FnMut(&Scope) -> SnippetResult + Send + 'static,
    {
        self.snippets.insert(
            name.into(),
            Box::new(move |scope| Evaluation::Ready(snippet(scope))),
        );
    }

    /// Register a snippet that settles through a channel (awaitable work).
    pub fn register_deferred<F>(&mut self, name: impl Into<String>, mut snippet: F)
    where
        F: FnMut(&Scope) -> Receiver<SnippetResult> + Send + 'static,
    {
        self.snippets.insert(
            name.into(),
            Box::new(move |scope| Evaluation::Pending(snippet(scope))),
        );
    }
}

impl SnippetEngine for FixtureEngine {
    fn eval(&mut self, code: &str, scope: &Scope) -> Evaluation {
        match self.snippets.get_mut(code.trim()) {
            Some(snippet) => snippet(scope),
            None => Evaluation::Ready(Err(SnippetFault::new(format!(
                "unknown snippet '{}'",
                code.trim()
            )))),
        }
    }
}
