//! Task executors
//!
//! - `LocalExecutor` - runs the command as a host subprocess
//!
//! The `Executor` trait is the seam the task manager drives; alternative
//! backends (or test doubles) plug in there.

pub mod local;
pub mod r#trait;

pub use local::LocalExecutor;
pub use r#trait::{Executor, ProcessOutput};
