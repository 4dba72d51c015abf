//! rrun - A declarative YAML task tree runner
//!
//! rrun resolves a nested tree of named tasks, defined in a `run.yml`
//! configuration file, from command-line arguments into an ordered execution
//! plan, then runs it synchronously, in parallel, or in multiplex mode with
//! interleaved colored output.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod ui;

// Re-export commonly used types
pub use error::{Result, RunError};

/// Current version of rrun
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
