//! Task resolution and execution engine
//!
//! This module turns the configuration tree plus a CLI argument vector into
//! an ordered execution plan and runs it as OS subprocesses.

pub mod command;
pub mod environ;
pub mod executor;
pub mod plan;
pub mod task;

// Re-export main types
pub use command::*;
pub use environ::*;
pub use executor::*;
pub use plan::*;
pub use task::*;
