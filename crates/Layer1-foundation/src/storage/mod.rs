//! Storage module for repl
//!
//! - `json`: JSON - config file load/save

pub(crate) mod json;

pub use json::JsonStore;
