//! Core Module - types shared across layers
//!
//! - `shell.rs`: shell selection for command tasks

pub mod shell;

pub use shell::ShellType;
