pub mod context;
pub mod scope;

pub use context::{HardeningReport, SandboxContext, BASELINE_DENYLIST};
pub use scope::Scope;
