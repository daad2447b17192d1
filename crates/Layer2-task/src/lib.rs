//! # repl-task
//!
//! Command task engine for repl.
//! Runs shell commands as tracked tasks, returns results inline when they
//! finish quickly, and hands back a pollable task id when they do not.
//!
//! ## Features
//!
//! - Task registry with a strictly forward state machine
//! - Local process executor (one subprocess per task, output captured in full)
//! - **Sync/async gate**: fixed deadline race, detached background completion
//! - **Status poller**: bounded wait for running tasks, side-effect free

pub mod executor;
pub mod gate;
pub mod manager;
pub mod poller;
pub mod state;
pub mod task;

pub use executor::{Executor, LocalExecutor, ProcessOutput};
pub use gate::CommandOutcome;
pub use manager::{TaskManager, TaskManagerConfig, POLL_INTERVAL, POLL_WINDOW, SYNC_TIMEOUT};
pub use state::TaskState;
pub use task::{CommandTask, TaskId, TaskSnapshot, FAILED_RETURN_CODE};
