//! # repl-foundation
//!
//! Foundation layer for the repl tool server:
//! - Error: the error taxonomy shared by every layer
//! - Core: shell selection shared by the task engine and the tools
//! - Config: `ReplConfig` (session, shell and python settings)
//! - Storage: `JsonStore` for global/project config files

pub mod config;
pub mod core;
pub mod error;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Core
// ============================================================================
pub use core::ShellType;

// ============================================================================
// Config
// ============================================================================
pub use config::{PythonSettings, ReplConfig, SessionSettings, ShellSettings, REPL_CONFIG_FILE};

// ============================================================================
// Storage
// ============================================================================
pub use storage::JsonStore;
