//! # repl-session
//!
//! Persistent interpreter sessions for repl.
//!
//! A session is one dedicated interpreter worker process. Code sent to a
//! session runs against a namespace that lives as long as the worker, so
//! names bound by one call are visible to the next. Sessions left idle past
//! the configured timeout are evicted by a background sweep.
//!
//! ## Features
//!
//! - Lazy worker spawn, respawn after a worker dies
//! - Serialized execution per session, independent across sessions
//! - Fresh output buffers per call
//! - Cleanup scheduler with explicit start/stop

mod cleanup;
mod driver;
pub mod registry;
pub mod session;
mod worker;

pub use registry::{SessionConfig, SessionRegistry};
pub use session::{ExecutionOutput, InterpreterSession, SessionId};
