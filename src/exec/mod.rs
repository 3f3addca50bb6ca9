pub mod cell;
pub mod engine;
pub mod protocol;
pub mod shell;
pub mod worker;

pub use cell::{ExecutionCell, SnippetCell};
pub use engine::{Evaluation, FixtureEngine, SnippetEngine, SnippetFault, SnippetResult};
pub use protocol::{RunRequest, RunResponse};
pub use shell::{ChildRegistry, ShellEngine};
pub use worker::WorkerCell;
