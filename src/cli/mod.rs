//! CLI interface and argument parsing
//!
//! This module handles command-line interface parsing and dispatch into the
//! task tree: execution, help, and completion candidates.

pub mod app;

// Re-export main types
pub use app::*;
