//! Config - repl settings
//!
//! - `repl.rs` - ReplConfig (session, shell, python)

mod repl;

pub use repl::{PythonSettings, ReplConfig, SessionSettings, ShellSettings, REPL_CONFIG_FILE};
