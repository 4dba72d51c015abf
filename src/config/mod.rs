//! Configuration parsing
//!
//! This module handles parsing of two-document run.yml configuration files
//! into task descriptors and runtime options.

pub mod parse;
pub mod types;

// Re-export main types
pub use parse::*;
pub use types::*;
