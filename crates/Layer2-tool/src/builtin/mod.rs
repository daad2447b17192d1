//! Builtin tools for repl

pub mod perl;
pub mod python;
pub mod python_session;
pub mod shell;
pub mod shell_status;
