//! Error types for repl
//!
//! Only caller-input mistakes (validation, unknown ids) cross the tool
//! boundary as errors. Faults raised by executed code or commands are
//! recorded as output text and never become an `Error`.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// repl error type
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Caller input
    // ========================================================================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No session found with id: {0}")]
    SessionNotFound(String),

    #[error("Task {0} not found")]
    TaskNotFound(String),

    // ========================================================================
    // Execution
    // ========================================================================
    #[error("Process error: {0}")]
    Process(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    // ========================================================================
    // Protocol / config
    // ========================================================================
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // External conversions
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Unknown session or task identifier
    pub fn is_lookup(&self) -> bool {
        matches!(self, Error::SessionNotFound(_) | Error::TaskNotFound(_))
    }

    /// Missing or malformed caller argument
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Helper for a missing required argument
    pub fn missing_argument(name: &str) -> Self {
        Error::Validation(format!("Missing {} parameter", name))
    }

    /// Helper for an illegal state transition
    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        Error::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
