//! Kernel module - server infrastructure and dependencies.

pub mod ai;
pub mod deps;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod traits;

pub use ai::FallbackAI;
pub use deps::{ServerDeps, TwilioAdapter};
pub use scheduled_tasks::{run_cleanup, start_scheduler, CleanupReport};
pub use test_dependencies::TestDependencies;
pub use traits::*;
